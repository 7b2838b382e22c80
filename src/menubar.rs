use crate::types::{Cell, Style};

/// Lay out key hints as cells: text inside `[...]` is bold, the rest dim.
/// Items are separated by two spaces.
pub fn menu_cells(items: &[&str]) -> Vec<Cell> {
    let bold = Style { bold: true, ..Default::default() };
    let dim = Style { dim: true, ..Default::default() };

    let mut cells = vec![Cell::default()];
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            cells.extend([Cell::default(), Cell::default()]);
        }
        let mut in_key = false;
        for ch in item.chars() {
            if ch == '[' {
                in_key = true;
            }
            let style = if in_key { bold.clone() } else { dim.clone() };
            cells.push(Cell { ch, style });
            if ch == ']' {
                in_key = false;
            }
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brackets_are_bold() {
        let cells = menu_cells(&["[q] quit", "[r] reverse"]);
        let text: String = cells.iter().map(|c| c.ch).collect();
        assert_eq!(text, " [q] quit  [r] reverse");
        assert!(cells[1].style.bold && cells[3].style.bold);
        assert!(cells[5].style.dim);
    }
}
