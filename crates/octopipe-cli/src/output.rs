use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cell(row: &[String], i: usize) -> String {
    match row.get(i) {
        Some(c) if !c.is_empty() => c.clone(),
        _ => "-".to_string(),
    }
}

/// Left-aligned columns separated by two spaces. Empty cells print as `-`.
pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .map(|r| cell(r, i).chars().count())
                .fold(h.len(), usize::max)
        })
        .collect();

    let render = |cells: Vec<String>| {
        let line = cells
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{c:w$}"))
            .collect::<Vec<_>>()
            .join("  ");
        println!("{}", line.trim_end());
    };

    render(headers.iter().map(|h| h.to_string()).collect());
    render(widths.iter().map(|&w| "-".repeat(w)).collect());
    for row in rows {
        render((0..headers.len()).map(|i| cell(row, i)).collect());
    }
}
