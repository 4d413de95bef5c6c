use crate::cms::content::{
    BannerContent, BlockContent, CardListContent, CtaContent, FaqContent, ImageContent, ListContent,
    StepListContent,
};
use crate::cms::url_check::{check_url, UrlCheck};
use serde::Serialize;

pub const MAX_TEXT_CHARS: usize = 10_000;
pub const MAX_RICHTEXT_CHARS: usize = 50_000;
pub const MAX_ALT_CHARS: usize = 250;
pub const MAX_CTA_TEXT_CHARS: usize = 80;
pub const MAX_LIST_ITEMS: usize = 50;
pub const MAX_LIST_ITEM_CHARS: usize = 500;
pub const MAX_FAQ_ITEMS: usize = 50;
pub const MAX_QUESTION_CHARS: usize = 200;
pub const MAX_ANSWER_CHARS: usize = 5_000;
pub const MAX_CARD_ITEMS: usize = 24;
pub const MAX_STEP_ITEMS: usize = 20;

/// One inline message attached to a form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

#[derive(Default)]
struct Issues(Vec<ValidationIssue>);

impl Issues {
    fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(ValidationIssue::new(field, message));
    }

    fn require(&mut self, field: &str, value: &str, label: &str) {
        if value.trim().is_empty() {
            self.push(field, format!("{} is required.", label));
        }
    }

    fn max_chars(&mut self, field: &str, value: &str, max: usize) {
        let count = value.chars().count();
        if count > max {
            self.push(field, format!("Must be at most {} characters ({} given).", max, count));
        }
    }

    fn item_range(&mut self, field: &str, len: usize, max: usize, noun: &str) {
        if len == 0 {
            self.push(field, format!("Add at least one {}.", noun));
        } else if len > max {
            self.push(field, format!("At most {} {}s are allowed ({} given).", max, noun, len));
        }
    }

    /// Blank is accepted; anything else must be a valid link.
    fn optional_link(&mut self, field: &str, value: &str) {
        match check_url(value) {
            UrlCheck::Empty | UrlCheck::Valid { .. } => {}
            UrlCheck::Suggest { suggestion, .. } => {
                self.push(field, format!("Invalid link. Did you mean {}?", suggestion))
            }
            UrlCheck::Invalid { reason } => self.push(field, reason),
        }
    }

    fn required_link(&mut self, field: &str, value: &str, label: &str) {
        if value.trim().is_empty() {
            self.push(field, format!("{} is required.", label));
        } else {
            self.optional_link(field, value);
        }
    }
}

/// Runs the type-specific rules; an empty result means the content can be saved.
pub fn validate(content: &BlockContent) -> Vec<ValidationIssue> {
    let mut issues = Issues::default();
    match content {
        BlockContent::Text(text) => issues.max_chars("value", &text.value, MAX_TEXT_CHARS),
        BlockContent::Richtext(rich) => issues.max_chars("value", &rich.value, MAX_RICHTEXT_CHARS),
        BlockContent::Image(image) => validate_image(image, &mut issues),
        BlockContent::Cta(cta) => validate_cta(cta, &mut issues),
        BlockContent::List(list) => validate_list(list, &mut issues),
        BlockContent::Faq(faq) => validate_faq(faq, &mut issues),
        BlockContent::Banner(banner) => validate_banner(banner, &mut issues),
        BlockContent::CardList(cards) => validate_cards(cards, &mut issues),
        BlockContent::StepList(steps) => validate_steps(steps, &mut issues),
    }
    issues.0
}

fn validate_image(image: &ImageContent, issues: &mut Issues) {
    issues.required_link("url", &image.url, "Image URL");
    issues.max_chars("alt", &image.alt, MAX_ALT_CHARS);
}

fn validate_cta(cta: &CtaContent, issues: &mut Issues) {
    issues.require("text", &cta.text, "Button text");
    issues.max_chars("text", &cta.text, MAX_CTA_TEXT_CHARS);
    issues.required_link("url", &cta.url, "Button link");
}

fn validate_list(list: &ListContent, issues: &mut Issues) {
    issues.item_range("items", list.items.len(), MAX_LIST_ITEMS, "item");
    for (i, item) in list.items.iter().enumerate() {
        let field = format!("items[{}]", i);
        issues.require(&field, item, "Item text");
        issues.max_chars(&field, item, MAX_LIST_ITEM_CHARS);
    }
}

fn validate_faq(faq: &FaqContent, issues: &mut Issues) {
    issues.item_range("items", faq.items.len(), MAX_FAQ_ITEMS, "question");
    for (i, item) in faq.items.iter().enumerate() {
        let question = format!("items[{}].question", i);
        let answer = format!("items[{}].answer", i);
        issues.require(&question, &item.question, "Question");
        issues.max_chars(&question, &item.question, MAX_QUESTION_CHARS);
        issues.require(&answer, &item.answer, "Answer");
        issues.max_chars(&answer, &item.answer, MAX_ANSWER_CHARS);
    }
}

fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

fn validate_banner(banner: &BannerContent, issues: &mut Issues) {
    issues.require("title", &banner.title, "Title");
    let has_text = !banner.cta_text.trim().is_empty();
    let has_link = !banner.cta_link.trim().is_empty();
    if has_text != has_link {
        issues.push("cta_link", "Button text and link must be filled in together.");
    }
    issues.optional_link("cta_link", &banner.cta_link);
    issues.optional_link("image_url", &banner.image_url);
    let color = banner.background_color.trim();
    if !color.is_empty() && !is_hex_color(color) {
        issues.push("background_color", "Use a hex color such as #1a2b3c.");
    }
}

fn validate_cards(cards: &CardListContent, issues: &mut Issues) {
    issues.item_range("items", cards.items.len(), MAX_CARD_ITEMS, "card");
    for (i, card) in cards.items.iter().enumerate() {
        issues.require(&format!("items[{}].title", i), &card.title, "Card title");
        if let Some(link) = &card.link {
            issues.optional_link(&format!("items[{}].link", i), link);
        }
        if let Some(image_url) = &card.image_url {
            issues.optional_link(&format!("items[{}].image_url", i), image_url);
        }
    }
}

fn validate_steps(steps: &StepListContent, issues: &mut Issues) {
    issues.item_range("items", steps.items.len(), MAX_STEP_ITEMS, "step");
    for (i, step) in steps.items.iter().enumerate() {
        issues.require(&format!("items[{}].title", i), &step.title, "Step title");
        if step.number as usize != i + 1 {
            issues.push(format!("items[{}].number", i), format!("Step should be number {}.", i + 1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::content::{FaqItem, StepItem, TextContent};

    fn fields(content: &BlockContent) -> Vec<String> {
        validate(content).into_iter().map(|i| i.field).collect()
    }

    #[test]
    fn cta_requires_text_and_valid_url() {
        let cta = BlockContent::Cta(CtaContent { url: "/contato".into(), ..CtaContent::default() });
        assert_eq!(fields(&cta), vec!["text"]);

        let cta = BlockContent::Cta(CtaContent {
            text: "Fale conosco".into(),
            url: "example.com".into(),
            ..CtaContent::default()
        });
        let issues = validate(&cta);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("https://example.com"));
    }

    #[test]
    fn faq_needs_one_complete_pair_within_limits() {
        assert_eq!(fields(&BlockContent::Faq(FaqContent::default())), vec!["items"]);

        let faq = BlockContent::Faq(FaqContent {
            items: vec![FaqItem::new("q".repeat(201), ""), FaqItem::new("Ok?", "a".repeat(5001))],
            allow_multiple: false,
        });
        assert_eq!(
            fields(&faq),
            vec!["items[0].question", "items[0].answer", "items[1].answer"]
        );
    }

    #[test]
    fn list_rejects_blank_items() {
        let list = BlockContent::List(ListContent { items: vec!["ok".into(), " ".into()], ..ListContent::default() });
        assert_eq!(fields(&list), vec!["items[1]"]);
    }

    #[test]
    fn banner_checks_pairing_and_color() {
        let banner = BlockContent::Banner(BannerContent {
            title: "Leilões".into(),
            cta_text: "Ver".into(),
            background_color: "blue".into(),
            ..BannerContent::default()
        });
        assert_eq!(fields(&banner), vec!["cta_link", "background_color"]);
    }

    #[test]
    fn steps_must_be_numbered_in_order() {
        let steps = BlockContent::StepList(StepListContent {
            items: vec![StepItem { number: 2, title: "Lance".into(), description: String::new() }],
        });
        assert_eq!(fields(&steps), vec!["items[0].number"]);
    }

    #[test]
    fn empty_text_is_a_valid_draft() {
        assert!(validate(&BlockContent::Text(TextContent::default())).is_empty());
    }
}
