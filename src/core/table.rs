use crate::domain::model::{InputTable, Record};
use crate::utils::error::{EtlError, Result};
use std::path::Path;

/// Tab for `.tsv` files, comma for everything else.
pub fn delimiter_for(path: &str) -> u8 {
    match Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("tsv") => b'\t',
        _ => b',',
    }
}

pub fn decode_table(bytes: &[u8], delimiter: u8) -> Result<InputTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(index, name)| {
            // Excel 匯出的 CSV 常帶 BOM
            if index == 0 {
                name.trim_start_matches('\u{feff}').to_string()
            } else {
                name.to_string()
            }
        })
        .collect();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let data = headers
            .iter()
            .enumerate()
            .map(|(index, name)| (name.clone(), row.get(index).unwrap_or_default().to_string()))
            .collect();
        records.push(Record::new(data));
    }

    Ok(InputTable { headers, records })
}

pub fn encode_table(columns: &[String], records: &[Record], delimiter: u8) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(columns)?;
    for record in records {
        writer.write_record(record.values())?;
    }

    writer
        .into_inner()
        .map_err(|e| EtlError::IoError(e.into_error()))
}
