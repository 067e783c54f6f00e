use crate::pretty;
use anyhow::{anyhow, ensure, Context, Result};
use bpaf::Bpaf;
use log::*;
use std::collections::BTreeMap;
use std::io::{Read, Write};
use weighted_variance::{Summary, WeightedVariance};

#[derive(Debug, Clone, Bpaf)]
pub struct Options {
    /// A column holding the weight of each row.  Without it, every row has
    /// weight 1
    #[bpaf(long, short, argument("COLUMN"))]
    pub weight: Option<String>,
    /// Print JSON instead of a table
    #[bpaf(long)]
    pub json: bool,
}

#[derive(Debug)]
pub struct State {
    pub groups: BTreeMap<String, Measurements>,
}
impl State {
    pub fn new() -> State {
        State {
            groups: BTreeMap::new(),
        }
    }
    pub fn update(
        &mut self,
        group: &str,
        values: impl Iterator<Item = (String, f64)>,
        weight: f64,
    ) {
        let measurements = self
            .groups
            .entry(group.to_string())
            .or_insert_with(Measurements::default);
        for (field, value) in values {
            measurements.update(field, value, weight);
        }
    }
    pub fn summaries(&self) -> BTreeMap<&str, BTreeMap<&str, Summary>> {
        self.groups
            .iter()
            .map(|(group, m)| (group.as_str(), m.summaries().collect()))
            .collect()
    }
}

#[derive(Clone, Debug, Default)]
pub struct Measurements(pub BTreeMap<String, WeightedVariance>);

impl Measurements {
    pub fn summaries(&self) -> impl Iterator<Item = (&str, Summary)> {
        self.0.iter().map(|(field, acc)| (field.as_str(), Summary::from(*acc)))
    }
    fn update(&mut self, field: String, value: f64, weight: f64) {
        self.0
            .entry(field)
            .or_insert_with(WeightedVariance::new)
            .add_observation(value, weight);
    }
}

pub fn summarize(opts: Options) -> Result<()> {
    let state = read_table(std::io::stdin(), opts.weight.as_deref())?;
    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();
    if opts.json {
        let s = serde_json::to_string(&state.summaries())?;
        writeln!(stdout, "{}", s)?;
    } else {
        pretty::print_table(&mut stdout, &state)?;
    }
    Ok(())
}

pub fn read_table(input: impl Read, weight_col: Option<&str>) -> Result<State> {
    let mut rdr = csv::Reader::from_reader(input);
    let headers = rdr.headers()?.clone();
    let group_col = headers
        .get(0)
        .ok_or_else(|| anyhow!("The input has no columns"))?;
    info!("Grouping by \"{}\"", group_col);

    let weight_idx = match weight_col {
        Some(name) => {
            let idx = headers
                .iter()
                .position(|x| x == name)
                .ok_or_else(|| anyhow!("There's no column called \"{}\"", name))?;
            ensure!(idx != 0, "\"{}\" is the group column", name);
            Some(idx)
        }
        None => None,
    };
    let fields = headers
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(idx, _)| Some(*idx) != weight_idx)
        .map(|(idx, name)| (idx, name.to_string()))
        .collect::<Vec<_>>();

    let mut state = State::new();
    for (rowno, row) in rdr.into_records().enumerate() {
        let row = row?;
        // Data rows start on line 2
        let lineno = rowno + 2;
        let group = row.get(0).unwrap_or_default();
        let weight = match weight_idx {
            Some(idx) => match parse_cell(row.get(idx).unwrap_or_default())
                .with_context(|| format!("line {}, column \"{}\"", lineno, &headers[idx]))?
            {
                Some(w) => w,
                None => {
                    debug!("line {}: no weight; skipping the row", lineno);
                    continue;
                }
            },
            None => 1.,
        };
        let mut values = Vec::with_capacity(fields.len());
        for (idx, name) in &fields {
            let cell = parse_cell(row.get(*idx).unwrap_or_default())
                .with_context(|| format!("line {}, column \"{}\"", lineno, name))?;
            if let Some(x) = cell {
                values.push((name.clone(), x));
            }
        }
        if values.is_empty() {
            debug!("line {}: no values; skipping the row", lineno);
            continue;
        }
        state.update(group, values.into_iter(), weight);
    }
    debug!("Read {} groups", state.groups.len());
    Ok(state)
}

/// Empty cells are `None`
fn parse_cell(cell: &str) -> Result<Option<f64>> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(None);
    }
    let x = cell
        .parse::<f64>()
        .with_context(|| format!("Couldn't parse \"{}\" as a number", cell))?;
    Ok(Some(x))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
bench,wall time,weight,user time
a,1,1,0.5
b,10,2,2
a,3,3,
b,20,2,4
a,5,0,1.5
";

    #[test]
    fn unweighted() {
        let state = read_table(TABLE.as_bytes(), None).unwrap();
        let summaries = state.summaries();
        assert_eq!(summaries.len(), 2);

        let a = &summaries["a"];
        let wall = a["wall time"];
        assert_eq!(wall.total_weight, 3.);
        assert_eq!(wall.mean, 3.);
        assert!((wall.std_dev - 2.).abs() < 1e-12);
        // The "weight" column is just another field here
        assert_eq!(a["weight"].total_weight, 3.);
        // The empty cell is skipped
        let user = a["user time"];
        assert_eq!(user.total_weight, 2.);
        assert_eq!(user.mean, 1.);

        assert_eq!(summaries["b"]["wall time"].mean, 15.);
    }

    #[test]
    fn weighted() {
        let state = read_table(TABLE.as_bytes(), Some("weight")).unwrap();
        let summaries = state.summaries();
        let a = &summaries["a"];
        assert!(a.get("weight").is_none());

        let wall = a["wall time"];
        assert_eq!(wall.total_weight, 4.);
        assert_eq!(wall.mean, 2.5);

        let user = summaries["b"]["user time"];
        assert_eq!(user.total_weight, 4.);
        assert_eq!(user.mean, 3.);
    }

    #[test]
    fn bad_weight_column() {
        assert!(read_table(TABLE.as_bytes(), Some("nope")).is_err());
        assert!(read_table(TABLE.as_bytes(), Some("bench")).is_err());
    }

    #[test]
    fn bad_cell() {
        let table = "bench,x\na,1\na,one\n";
        let err = read_table(table.as_bytes(), None).unwrap_err();
        assert!(format!("{:#}", err).contains("line 3, column \"x\""));
    }

    #[test]
    fn blank_cells() {
        let table = "bench,x,w\na,1,1\nb,,2\na,3,\nc,5,\n";
        let state = read_table(table.as_bytes(), Some("w")).unwrap();
        let summaries = state.summaries();
        // "b" has no values and "c" has no weight, so neither makes a group
        assert_eq!(summaries.keys().copied().collect::<Vec<_>>(), vec!["a"]);
        assert_eq!(summaries["a"]["x"].total_weight, 1.);
        assert_eq!(summaries["a"]["x"].mean, 1.);

        let s = serde_json::to_string(&summaries).unwrap();
        assert!(!s.contains(r#""b":{}"#));
    }

    #[test]
    fn json() {
        let table = "bench,x\na,1\na,3\nb,2\n";
        let state = read_table(table.as_bytes(), None).unwrap();
        let s = serde_json::to_string(&state.summaries()).unwrap();
        assert_eq!(
            s,
            r#"{"a":{"x":{"total_weight":2.0,"mean":2.0,"std_dev":1.4142135623730951}},"b":{"x":{"total_weight":1.0,"mean":2.0,"std_dev":null}}}"#
        );
    }
}
