use std::fmt::Write;

use crate::aggregate::AggregateResult;

const HEADERS: [&str; 4] = ["Method", "Pi approximation", "Difference to pi", "Time (seconds)"];

pub fn format_pi(value: f64) -> String {
    format!("{:.20}", value)
}

/// Fixed-width table: method, approximation, difference to π, elapsed time.
pub fn format_table(results: &[AggregateResult]) -> String {
    let rows: Vec<[String; 4]> = results
        .iter()
        .map(|result| {
            [
                result.strategy.name().to_string(),
                format_pi(result.pi_approx),
                format!("{:.20}", result.absolute_error()),
                format!("{:.6}", result.elapsed.as_secs_f64()),
            ]
        })
        .collect();

    let mut widths: [usize; 4] = HEADERS.map(str::len);
    for row in rows.iter() {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.len());
        }
    }

    let mut table: String = String::new();
    write_row(&mut table, &HEADERS.map(String::from), &widths);
    let rule: [String; 4] = widths.map(|width| "-".repeat(width));
    write_row(&mut table, &rule, &widths);
    for row in rows.iter() {
        write_row(&mut table, row, &widths);
    }
    table
}

fn write_row(table: &mut String, cells: &[String; 4], widths: &[usize; 4]) {
    let _ = write!(table, "{:<width$}", cells[0], width = widths[0]);
    for (cell, width) in cells.iter().zip(widths).skip(1) {
        let _ = write!(table, "  {:>width$}", cell, width = *width);
    }
    table.push('\n');
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::job::Strategy;

    #[test]
    fn pi_has_twenty_decimals() {
        assert_eq!(format_pi(3.0), "3.00000000000000000000");
    }

    #[test]
    fn table_layout() {
        let results: Vec<AggregateResult> = vec![
            AggregateResult::new(Strategy::Serial, 3.0, Duration::from_millis(1500)),
            AggregateResult::new(Strategy::ThreadPool, 3.5, Duration::from_millis(2)),
        ];
        let table: String = format_table(&results);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Method"));
        assert!(lines[1].starts_with("-----"));
        assert!(lines[2].starts_with("Leibniz "));
        assert!(lines[2].ends_with("1.500000"));
        assert!(lines[3].starts_with("Thread-Pool"));
        assert!(lines[3].contains("3.50000000000000000000"));
        assert!(lines.iter().all(|line| line.len() == lines[0].len()));
    }
}
