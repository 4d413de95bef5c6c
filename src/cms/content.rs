use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Tag stored alongside a block that selects its content shape and editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockType {
    Text,
    Richtext,
    Image,
    Cta,
    List,
    Faq,
    Banner,
    CardList,
    StepList,
}

impl BlockType {
    pub const ALL: [BlockType; 9] = [
        BlockType::Text,
        BlockType::Richtext,
        BlockType::Image,
        BlockType::Cta,
        BlockType::List,
        BlockType::Faq,
        BlockType::Banner,
        BlockType::CardList,
        BlockType::StepList,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BlockType::Text => "text",
            BlockType::Richtext => "richtext",
            BlockType::Image => "image",
            BlockType::Cta => "cta",
            BlockType::List => "list",
            BlockType::Faq => "faq",
            BlockType::Banner => "banner",
            BlockType::CardList => "card-list",
            BlockType::StepList => "step-list",
        }
    }

    /// Accepts the wire tag, tolerating `_` for `-` and surrounding whitespace.
    pub fn parse(tag: &str) -> Option<Self> {
        let normalized = tag.trim().to_lowercase().replace('_', "-");
        Self::ALL.into_iter().find(|t| t.as_str() == normalized)
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RichTextFormat {
    #[default]
    Html,
    Markdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CtaStyle {
    #[default]
    Primary,
    Secondary,
    Outline,
    Link,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LinkTarget {
    #[default]
    #[serde(rename = "_self")]
    SameTab,
    #[serde(rename = "_blank")]
    NewTab,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListStyle {
    #[default]
    Bullet,
    Check,
    Number,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TextContent {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RichTextContent {
    pub value: String,
    pub format: RichTextFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageContent {
    pub url: String,
    pub alt: String,
    pub asset_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CtaContent {
    pub text: String,
    pub url: String,
    pub style: CtaStyle,
    pub target: LinkTarget,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListContent {
    pub items: Vec<String>,
    pub ordered: bool,
    pub style: ListStyle,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FaqItem {
    pub question: String,
    pub answer: String,
}

impl FaqItem {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self { question: question.into(), answer: answer.into() }
    }

    /// Identity used when merging imports: trimmed, case-insensitive question.
    pub fn dedup_key(&self) -> String {
        self.question.trim().to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FaqContent {
    pub items: Vec<FaqItem>,
    #[serde(rename = "allowMultiple")]
    pub allow_multiple: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BannerContent {
    pub title: String,
    pub subtitle: String,
    pub image_url: String,
    pub cta_text: String,
    pub cta_link: String,
    pub background_color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CardItem {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CardListContent {
    pub items: Vec<CardItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StepItem {
    pub number: u32,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StepListContent {
    pub items: Vec<StepItem>,
}

/// Content of one block, one variant per [`BlockType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockContent {
    Text(TextContent),
    Richtext(RichTextContent),
    Image(ImageContent),
    Cta(CtaContent),
    List(ListContent),
    Faq(FaqContent),
    Banner(BannerContent),
    CardList(CardListContent),
    StepList(StepListContent),
}

/// Which editor actions are currently enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EditorActions {
    pub can_save: bool,
    pub can_publish: bool,
}

/// True for `null` and `{}`: a stored value that carries no content.
pub fn is_blank_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

impl BlockContent {
    pub fn default_for(block_type: BlockType) -> Self {
        match block_type {
            BlockType::Text => BlockContent::Text(TextContent::default()),
            BlockType::Richtext => BlockContent::Richtext(RichTextContent::default()),
            BlockType::Image => BlockContent::Image(ImageContent::default()),
            BlockType::Cta => BlockContent::Cta(CtaContent::default()),
            BlockType::List => BlockContent::List(ListContent::default()),
            BlockType::Faq => BlockContent::Faq(FaqContent::default()),
            BlockType::Banner => BlockContent::Banner(BannerContent::default()),
            BlockType::CardList => BlockContent::CardList(CardListContent::default()),
            BlockType::StepList => BlockContent::StepList(StepListContent::default()),
        }
    }

    pub fn block_type(&self) -> BlockType {
        match self {
            BlockContent::Text(_) => BlockType::Text,
            BlockContent::Richtext(_) => BlockType::Richtext,
            BlockContent::Image(_) => BlockType::Image,
            BlockContent::Cta(_) => BlockType::Cta,
            BlockContent::List(_) => BlockType::List,
            BlockContent::Faq(_) => BlockType::Faq,
            BlockContent::Banner(_) => BlockType::Banner,
            BlockContent::CardList(_) => BlockType::CardList,
            BlockContent::StepList(_) => BlockType::StepList,
        }
    }

    pub fn from_json(block_type: BlockType, value: &Value) -> Result<Self, serde_json::Error> {
        let value = value.clone();
        Ok(match block_type {
            BlockType::Text => BlockContent::Text(serde_json::from_value(value)?),
            BlockType::Richtext => BlockContent::Richtext(serde_json::from_value(value)?),
            BlockType::Image => BlockContent::Image(serde_json::from_value(value)?),
            BlockType::Cta => BlockContent::Cta(serde_json::from_value(value)?),
            BlockType::List => BlockContent::List(serde_json::from_value(value)?),
            BlockType::Faq => BlockContent::Faq(serde_json::from_value(value)?),
            BlockType::Banner => BlockContent::Banner(serde_json::from_value(value)?),
            BlockType::CardList => BlockContent::CardList(serde_json::from_value(value)?),
            BlockType::StepList => {
                let mut steps: StepListContent = serde_json::from_value(value)?;
                renumber_steps(&mut steps.items);
                BlockContent::StepList(steps)
            }
        })
    }

    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        match self {
            BlockContent::Text(c) => serde_json::to_value(c),
            BlockContent::Richtext(c) => serde_json::to_value(c),
            BlockContent::Image(c) => serde_json::to_value(c),
            BlockContent::Cta(c) => serde_json::to_value(c),
            BlockContent::List(c) => serde_json::to_value(c),
            BlockContent::Faq(c) => serde_json::to_value(c),
            BlockContent::Banner(c) => serde_json::to_value(c),
            BlockContent::CardList(c) => serde_json::to_value(c),
            BlockContent::StepList(c) => serde_json::to_value(c),
        }
    }

    pub fn actions(&self) -> EditorActions {
        match self {
            BlockContent::Image(image) => {
                let has_url = !image.url.trim().is_empty();
                EditorActions { can_save: has_url, can_publish: has_url }
            }
            BlockContent::Text(text) => EditorActions {
                can_save: true,
                can_publish: !text.value.trim().is_empty(),
            },
            BlockContent::Richtext(rich) => EditorActions {
                can_save: true,
                can_publish: !rich.value.trim().is_empty(),
            },
            _ => EditorActions { can_save: true, can_publish: true },
        }
    }

    /// Number of reorderable items, or `None` for single-value blocks.
    pub fn item_count(&self) -> Option<usize> {
        match self {
            BlockContent::List(c) => Some(c.items.len()),
            BlockContent::Faq(c) => Some(c.items.len()),
            BlockContent::CardList(c) => Some(c.items.len()),
            BlockContent::StepList(c) => Some(c.items.len()),
            _ => None,
        }
    }

    /// Moves the item at `from` so it ends up at `to`; every other item keeps
    /// its relative order. Returns false when the block has no items or an
    /// index is out of range.
    pub fn move_item(&mut self, from: usize, to: usize) -> bool {
        match self {
            BlockContent::List(c) => splice_move(&mut c.items, from, to),
            BlockContent::Faq(c) => splice_move(&mut c.items, from, to),
            BlockContent::CardList(c) => splice_move(&mut c.items, from, to),
            BlockContent::StepList(c) => {
                let moved = splice_move(&mut c.items, from, to);
                renumber_steps(&mut c.items);
                moved
            }
            _ => false,
        }
    }

    pub fn move_up(&mut self, index: usize) -> bool {
        index > 0 && self.move_item(index, index - 1)
    }

    pub fn move_down(&mut self, index: usize) -> bool {
        self.move_item(index, index + 1)
    }

    pub fn remove_item(&mut self, index: usize) -> bool {
        match self {
            BlockContent::List(c) => remove_at(&mut c.items, index),
            BlockContent::Faq(c) => remove_at(&mut c.items, index),
            BlockContent::CardList(c) => remove_at(&mut c.items, index),
            BlockContent::StepList(c) => {
                let removed = remove_at(&mut c.items, index);
                renumber_steps(&mut c.items);
                removed
            }
            _ => false,
        }
    }
}

fn splice_move<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from >= items.len() || to >= items.len() {
        return false;
    }
    if from != to {
        let item = items.remove(from);
        items.insert(to, item);
    }
    true
}

fn remove_at<T>(items: &mut Vec<T>, index: usize) -> bool {
    if index >= items.len() {
        return false;
    }
    items.remove(index);
    true
}

/// Step numbers always follow array order, starting at 1.
pub fn renumber_steps(items: &mut [StepItem]) {
    for (i, step) in items.iter_mut().enumerate() {
        step.number = (i + 1) as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn list(items: &[&str]) -> BlockContent {
        BlockContent::List(ListContent {
            items: items.iter().map(|s| s.to_string()).collect(),
            ..ListContent::default()
        })
    }

    #[test]
    fn block_type_parse_accepts_underscores() {
        assert_eq!(BlockType::parse("card_list"), Some(BlockType::CardList));
        assert_eq!(BlockType::parse(" Step-List "), Some(BlockType::StepList));
        assert_eq!(BlockType::parse("carousel"), None);
    }

    #[test]
    fn faq_keeps_allow_multiple_wire_name() {
        let content = BlockContent::from_json(
            BlockType::Faq,
            &json!({"items": [{"question": "Q", "answer": "A"}], "allowMultiple": true}),
        )
        .expect("faq decodes");
        let BlockContent::Faq(faq) = &content else { panic!("expected faq") };
        assert!(faq.allow_multiple);
        assert_eq!(content.to_json().expect("encodes")["allowMultiple"], json!(true));
    }

    #[test]
    fn partial_objects_fill_defaults() {
        let content = BlockContent::from_json(BlockType::Cta, &json!({"text": "Cadastre-se"}))
            .expect("cta decodes");
        assert_eq!(
            content,
            BlockContent::Cta(CtaContent { text: "Cadastre-se".into(), ..CtaContent::default() })
        );
    }

    #[test]
    fn move_up_then_down_restores_order() {
        let original = list(&["a", "b", "c", "d"]);
        for i in 1..4 {
            let mut content = original.clone();
            assert!(content.move_up(i));
            assert!(content.move_down(i - 1));
            assert_eq!(content, original);
        }
    }

    #[test]
    fn move_item_preserves_other_positions() {
        let mut content = list(&["a", "b", "c", "d"]);
        assert!(content.move_item(0, 2));
        assert_eq!(content, list(&["b", "c", "a", "d"]));
        assert!(!content.move_item(0, 4));
        assert!(!content.move_up(0));
    }

    #[test]
    fn step_lists_renumber_after_reorder_and_delete() {
        let mut content = BlockContent::StepList(StepListContent {
            items: vec![
                StepItem { number: 1, title: "Cadastro".into(), description: String::new() },
                StepItem { number: 2, title: "Habilitação".into(), description: String::new() },
                StepItem { number: 3, title: "Lance".into(), description: String::new() },
            ],
        });
        assert!(content.move_item(2, 0));
        let BlockContent::StepList(steps) = &content else { panic!("expected steps") };
        let titles: Vec<_> = steps.items.iter().map(|s| (s.number, s.title.as_str())).collect();
        assert_eq!(titles, vec![(1, "Lance"), (2, "Cadastro"), (3, "Habilitação")]);

        assert!(content.remove_item(0));
        let BlockContent::StepList(steps) = &content else { panic!("expected steps") };
        let numbers: Vec<_> = steps.items.iter().map(|s| s.number).collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn image_actions_disabled_without_url() {
        let mut image = ImageContent::default();
        assert_eq!(
            BlockContent::Image(image.clone()).actions(),
            EditorActions { can_save: false, can_publish: false }
        );
        image.url = "/media/a.png".into();
        assert!(BlockContent::Image(image).actions().can_publish);
    }

    #[test]
    fn text_publish_disabled_while_empty() {
        let actions = BlockContent::Text(TextContent { value: "  ".into() }).actions();
        assert!(actions.can_save);
        assert!(!actions.can_publish);
    }
}
