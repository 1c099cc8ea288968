// Rust guideline compliant 2026-10-14

//! CSV re-serialization of normalized rows for the upload body.

use domain::{Fields, NormalizedRow, PredictionError};
use std::collections::HashMap;

/// Serialize `rows` as CSV.
///
/// The header is the union of every row's column names in first-seen order;
/// a row lacking a column gets an empty cell.
///
/// # Errors
///
/// Returns [`PredictionError::Encode`] when the CSV writer fails.
pub fn encode_csv(rows: &[NormalizedRow]) -> Result<Vec<u8>, PredictionError> {
    let flattened: Vec<Fields> = rows.iter().map(NormalizedRow::to_fields).collect();

    let mut columns: HashMap<&str, usize> = HashMap::new();
    let mut header: Vec<&str> = Vec::new();
    for key in flattened.iter().flat_map(Fields::keys) {
        columns.entry(key).or_insert_with(|| {
            header.push(key);
            header.len() - 1
        });
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    if !header.is_empty() {
        writer.write_record(&header).map_err(|e| encode_error(&e))?;
    }
    // One slot per header column, filled by walking the row's own entries.
    let mut record = vec![String::new(); header.len()];
    for fields in &flattened {
        record.iter_mut().for_each(String::clear);
        for (key, value) in fields.iter() {
            if let Some(slot) = columns.get(key).and_then(|&col| record.get_mut(col)) {
                slot.push_str(&value.as_text());
            }
        }
        writer.write_record(&record).map_err(|e| encode_error(&e))?;
    }
    let bytes = writer.into_inner().map_err(|e| PredictionError::Encode {
        reason: e.error().to_string(),
    })?;
    log::debug!(
        "prediction_client.encoded: rows={} columns={} bytes={}",
        rows.len(),
        header.len(),
        bytes.len()
    );
    Ok(bytes)
}

fn encode_error(err: &csv::Error) -> PredictionError {
    PredictionError::Encode {
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::encode_csv;
    use domain::{Category, DerivedTime, Fields, NormalizedRow, UsState};

    fn row(id: &str, extra: &[(&str, &str)]) -> NormalizedRow {
        NormalizedRow {
            id: id.to_owned(),
            cc_num: None,
            amount: 10.0,
            date: None,
            time: DerivedTime::default(),
            category: Category::DEFAULT,
            gender_m: false,
            state: UsState::DEFAULT,
            age: 30.0,
            extra: extra.iter().copied().collect::<Fields>(),
        }
    }

    fn parse(bytes: &[u8]) -> (Vec<String>, Vec<Vec<String>>) {
        let mut reader = csv::Reader::from_reader(bytes);
        let header = reader.headers().unwrap().iter().map(str::to_owned).collect();
        let records = reader
            .records()
            .map(|r| r.unwrap().iter().map(str::to_owned).collect())
            .collect();
        (header, records)
    }

    #[test]
    fn empty_input_is_empty_body() {
        assert!(encode_csv(&[]).unwrap().is_empty());
    }

    #[test]
    fn header_is_union_in_first_seen_order() {
        let rows = [row("A", &[("merchant", "Acme")]), row("B", &[("city", "Boston")])];
        let (header, records) = parse(&encode_csv(&rows).unwrap());

        assert_eq!(header[0], "merchant");
        let city = header.iter().position(|h| h == "city").unwrap();
        // "city" first appears in the second row, after the first row's columns.
        assert_eq!(city, header.len() - 1);
        assert!(header.contains(&"category_13".to_owned()));
        assert!(header.contains(&"state_WY".to_owned()));

        assert_eq!(records.len(), 2);
        assert_eq!(records[0][city], "");
        assert_eq!(records[1][city], "Boston");
        assert_eq!(records[1][0], "");
    }

    #[test]
    fn values_render_as_plain_text() {
        let (header, records) = parse(&encode_csv(&[row("T-1", &[])]).unwrap());
        let cell = |name: &str| {
            let i = header.iter().position(|h| h == name).unwrap();
            records[0][i].clone()
        };
        assert_eq!(cell("id"), "T-1");
        assert_eq!(cell("trans_num"), "T-1");
        assert_eq!(cell("amt"), "10");
        assert_eq!(cell("category_1"), "1");
        assert_eq!(cell("category_2"), "0");
        assert_eq!(cell("state_CA"), "1");
        assert_eq!(cell("gender_M"), "0");
        assert_eq!(cell("age"), "30");
    }

    #[test]
    fn rows_with_differing_columns_line_up() {
        let rows: Vec<NormalizedRow> = (0..500)
            .map(|i| {
                let id = format!("R{i}");
                if i % 2 == 0 {
                    row(&id, &[("merchant", "Acme"), ("city", "Boston")])
                } else {
                    row(&id, &[("zip", "02134")])
                }
            })
            .collect();
        let (header, records) = parse(&encode_csv(&rows).unwrap());
        let col = |name: &str| header.iter().position(|h| h == name).unwrap();

        assert_eq!(records.len(), 500);
        assert_eq!(header.iter().filter(|h| *h == "id").count(), 1);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.len(), header.len());
            assert_eq!(record[col("id")], format!("R{i}"));
            let expected_zip = if i % 2 == 0 { "" } else { "02134" };
            assert_eq!(record[col("zip")], expected_zip);
            let expected_city = if i % 2 == 0 { "Boston" } else { "" };
            assert_eq!(record[col("city")], expected_city);
        }
    }

    #[test]
    fn cells_with_commas_are_quoted() {
        let bytes = encode_csv(&[row("A", &[("merchant", "Smith, Jones & Co")])]).unwrap();
        let (_, records) = parse(&bytes);
        assert_eq!(records[0][0], "Smith, Jones & Co");
    }
}
