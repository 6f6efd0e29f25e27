//! `csvgate signatures`: list the effective signature table

use crate::cli::output::{print_json, print_table};
use anyhow::Result;
use csvgate_detect::{ByteSignature, SignatureBackend, SignatureMatcher};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct SignatureRow<'a> {
    rank: usize,
    label: &'a str,
    mime: Option<&'a str>,
    offset: usize,
    lookahead: usize,
    ignore_case: bool,
    pattern: String,
    specificity: i32,
}

impl<'a> SignatureRow<'a> {
    fn new(rank: usize, signature: &'a ByteSignature) -> Self {
        Self {
            rank,
            label: &signature.label,
            mime: Some(signature.mime.as_str()).filter(|m| !m.is_empty()),
            offset: signature.offset,
            lookahead: signature.lookahead,
            ignore_case: signature.ignore_ascii_case,
            pattern: signature.pattern.to_hex(),
            specificity: signature.specificity,
        }
    }
}

pub fn run(matcher: &SignatureMatcher, json: bool) -> Result<()> {
    let rows: Vec<SignatureRow<'_>> = matcher
        .table()
        .iter()
        .enumerate()
        .map(|(i, sig)| SignatureRow::new(i + 1, sig))
        .collect();

    if json {
        return print_json(&rows);
    }

    if rows.is_empty() {
        println!("No signatures registered; every file goes through the text probe.");
        return Ok(());
    }

    let table_rows = rows
        .iter()
        .map(|row| {
            let mut position = row.offset.to_string();
            if row.lookahead > 0 {
                position.push_str(&format!("+{}", row.lookahead));
            }
            vec![
                row.rank.to_string(),
                row.label.to_string(),
                row.mime.unwrap_or("-").to_string(),
                position,
                row.pattern.clone(),
                row.specificity.to_string(),
            ]
        })
        .collect();

    print_table(
        &["#", "Label", "MIME", "Offset", "Pattern", "Specificity"],
        table_rows,
    );
    println!(
        "{} signatures via {} (max span {} bytes)",
        rows.len(),
        matcher.name(),
        matcher.table().max_span()
    );
    Ok(())
}
