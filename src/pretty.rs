use crate::summarize::State;
use ansi_term::Style;
use anyhow::Result;
use std::fmt;
use std::io::Write;

pub fn print_table(out: impl Write, state: &State) -> Result<()> {
    let mut out = tabwriter::TabWriter::new(out);
    writeln!(out, "group\tfield\tweight\tmean\tstddev")?;
    for (group, measurements) in &state.groups {
        for (field, summary) in measurements.summaries() {
            writeln!(
                out,
                "{}\t{}\t{}\t{:.6}\t{}",
                group,
                field,
                summary.total_weight,
                summary.mean,
                PrettyStdDev(summary.std_dev),
            )?;
        }
    }
    out.flush()?;
    Ok(())
}

pub struct PrettyStdDev(pub f64);

impl fmt::Display for PrettyStdDev {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0.is_finite() {
            write!(f, "{:.6}", self.0)
        } else {
            write!(f, "{}", Style::new().dimmed().paint("insufficient data"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summarize::read_table;

    #[test]
    fn table() {
        let table = "bench,x\na,1\na,3\nb,2\n";
        let state = read_table(table.as_bytes(), None).unwrap();
        let mut buf = vec![];
        print_table(&mut buf, &state).unwrap();
        let out = String::from_utf8(buf).unwrap();
        let lines = out.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("group"));
        assert!(lines[1].contains("2.000000"));
        assert!(lines[1].contains("1.414214"));
        assert!(lines[2].contains("insufficient data"));
    }

    #[test]
    fn std_dev() {
        assert_eq!(PrettyStdDev(0.5).to_string(), "0.500000");
        assert!(PrettyStdDev(f64::NAN)
            .to_string()
            .contains("insufficient data"));
    }
}
