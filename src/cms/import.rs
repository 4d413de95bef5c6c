//! Bulk import of list items and FAQ pairs from pasted text.
//!
//! A paste is first tried as a strict JSON array. Anything that is not one
//! falls back to line-based parsing, where each bad line is reported on its
//! own and left out of the preview while the good lines still import.

use crate::cms::content::FaqItem;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineError {
    /// 1-based line number (or array position for JSON input).
    pub line: usize,
    pub content: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportPreview<T> {
    pub items: Vec<T>,
    pub errors: Vec<LineError>,
}

impl<T> ImportPreview<T> {
    fn empty() -> Self {
        Self { items: Vec::new(), errors: Vec::new() }
    }
}

const BULLETS: [&str; 3] = ["- ", "* ", "• "];

fn strip_bullet(line: &str) -> &str {
    BULLETS
        .iter()
        .find_map(|b| line.strip_prefix(b))
        .map(str::trim_start)
        .unwrap_or(line)
}

fn non_blank_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

pub fn parse_list_import(text: &str) -> ImportPreview<String> {
    if let Ok(values) = serde_json::from_str::<Vec<String>>(text.trim()) {
        let mut preview = ImportPreview::empty();
        for (i, value) in values.into_iter().enumerate() {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                preview.errors.push(LineError {
                    line: i + 1,
                    content: value.clone(),
                    message: "Empty item.".to_string(),
                });
            } else {
                preview.items.push(trimmed.to_string());
            }
        }
        return preview;
    }

    let mut preview = ImportPreview::empty();
    for (_, line) in non_blank_lines(text) {
        let item = strip_bullet(line);
        if !item.is_empty() {
            preview.items.push(item.to_string());
        }
    }
    preview
}

#[derive(Deserialize)]
struct RawFaq {
    #[serde(default)]
    question: String,
    #[serde(default)]
    answer: String,
}

/// Splits on the first `|`, or on the first `::` when the line has no `|`.
fn split_faq_line(line: &str) -> Option<(&str, &str)> {
    line.split_once('|').or_else(|| line.split_once("::"))
}

pub fn parse_faq_import(text: &str) -> ImportPreview<FaqItem> {
    if let Ok(values) = serde_json::from_str::<Vec<RawFaq>>(text.trim()) {
        let mut preview = ImportPreview::empty();
        for (i, raw) in values.into_iter().enumerate() {
            let question = raw.question.trim();
            let answer = raw.answer.trim();
            if question.is_empty() || answer.is_empty() {
                preview.errors.push(LineError {
                    line: i + 1,
                    content: format!("{} | {}", raw.question, raw.answer),
                    message: "Both question and answer are required.".to_string(),
                });
            } else {
                preview.items.push(FaqItem::new(question, answer));
            }
        }
        return preview;
    }

    let mut preview = ImportPreview::empty();
    for (number, line) in non_blank_lines(text) {
        match split_faq_line(line) {
            Some((question, answer)) if !question.trim().is_empty() && !answer.trim().is_empty() => {
                preview.items.push(FaqItem::new(question.trim(), answer.trim()));
            }
            Some(_) => preview.errors.push(LineError {
                line: number,
                content: line.to_string(),
                message: "Both question and answer are required.".to_string(),
            }),
            None => preview.errors.push(LineError {
                line: number,
                content: line.to_string(),
                message: "Separate question and answer with | or ::.".to_string(),
            }),
        }
    }
    preview
}

/// Appends `incoming` to `existing`, skipping exact duplicates.
pub fn merge_list_items(existing: &[String], incoming: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = existing.iter().cloned().collect();
    let mut merged = existing.to_vec();
    for item in incoming {
        if seen.insert(item.clone()) {
            merged.push(item);
        }
    }
    merged
}

/// Merges by case-insensitive trimmed question; the last entry seen for a
/// question wins and takes the slot of the first one.
pub fn merge_faq_items(existing: &[FaqItem], incoming: Vec<FaqItem>) -> Vec<FaqItem> {
    let mut merged: Vec<FaqItem> = Vec::with_capacity(existing.len() + incoming.len());
    let mut positions: HashMap<String, usize> = HashMap::new();
    for item in existing.iter().cloned().chain(incoming) {
        match positions.get(&item.dedup_key()) {
            Some(&index) => merged[index] = item,
            None => {
                positions.insert(item.dedup_key(), merged.len());
                merged.push(item);
            }
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn list_lines_dedup_against_existing() {
        let preview = parse_list_import("a\nb\na");
        assert!(preview.errors.is_empty());
        let merged = merge_list_items(&["a".to_string()], preview.items);
        assert_eq!(merged, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn list_prefers_json_array() {
        let preview = parse_list_import(r#"["Matrícula atualizada", "  ", "Sem dívidas"]"#);
        assert_eq!(preview.items, vec!["Matrícula atualizada", "Sem dívidas"]);
        assert_eq!(preview.errors.len(), 1);
        assert_eq!(preview.errors[0].line, 2);
    }

    #[test]
    fn broken_json_falls_back_to_lines() {
        let preview = parse_list_import("[\"a\",\n- b");
        assert_eq!(preview.items, vec!["[\"a\",", "b"]);
    }

    #[test]
    fn faq_lines_report_bad_lines_and_keep_good_ones() {
        let preview = parse_faq_import("Q1 | A1\nbad line without delimiter\nQ2 :: A2");
        assert_eq!(preview.items, vec![FaqItem::new("Q1", "A1"), FaqItem::new("Q2", "A2")]);
        assert_eq!(preview.errors.len(), 1);
        assert_eq!(preview.errors[0].line, 2);
        assert_eq!(preview.errors[0].content, "bad line without delimiter");

        let merged = merge_faq_items(&[], preview.items);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn faq_pipe_takes_precedence_over_double_colon() {
        let preview = parse_faq_import("Horário :: manhã | Das 9h às 18h");
        assert_eq!(preview.items, vec![FaqItem::new("Horário :: manhã", "Das 9h às 18h")]);
    }

    #[test]
    fn faq_json_objects() {
        let preview = parse_faq_import(r#"[{"question": "Posso financiar?", "answer": "Sim"}, {"question": "x"}]"#);
        assert_eq!(preview.items, vec![FaqItem::new("Posso financiar?", "Sim")]);
        assert_eq!(preview.errors.len(), 1);
    }

    #[test]
    fn faq_merge_keeps_last_seen_in_first_slot() {
        let existing = vec![FaqItem::new("Como participar?", "Antigo"), FaqItem::new("Prazo?", "30 dias")];
        let incoming = vec![FaqItem::new("  como PARTICIPAR? ", "Novo"), FaqItem::new("Taxas?", "5%")];
        let merged = merge_faq_items(&existing, incoming);
        assert_eq!(
            merged,
            vec![
                FaqItem::new("  como PARTICIPAR? ", "Novo"),
                FaqItem::new("Prazo?", "30 dias"),
                FaqItem::new("Taxas?", "5%"),
            ]
        );
    }
}
