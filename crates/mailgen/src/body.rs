//! Typed e-mail content.
//!
//! [`Email`] is a ready-made render request for the bundled themes. Fields
//! serialize in camelCase, the names the themes read. Requests can equally be
//! built with `serde_json::json!`; these types only spare callers the key
//! names.
//!
//! ```rust
//! use mailgen::{Action, Button, Email, EmailBody};
//!
//! let email = Email::new(
//!     EmailBody::new()
//!         .name("Jane")
//!         .intro("Welcome to Acme! We're very excited to have you on board.")
//!         .action(Action::new(
//!             "To get started with Acme, please click here:",
//!             Button::new("Confirm your account", "https://acme.test/confirm").color("#22BC66"),
//!         ))
//!         .outro("Need help, or have questions? Just reply to this email."),
//! );
//! # let _ = email;
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A render request: `{ "body": { ... } }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Email {
    pub body: EmailBody,
}

impl Email {
    pub fn new(body: EmailBody) -> Self {
        Self { body }
    }
}

impl From<EmailBody> for Email {
    fn from(body: EmailBody) -> Self {
        Self::new(body)
    }
}

/// Content of a transactional e-mail.
///
/// Every field is optional. `intro`, `table`, `action` and `outro` accept a
/// single value or a list when deserialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmailBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Replaces the `Hi` of the greeting line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub greeting: Option<String>,
    /// Replaces the `Yours truly` closing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    /// Replaces the whole greeting line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub intro: Vec<String>,
    /// Key/value lines, in insertion order.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub dictionary: Map<String, Value>,
    #[serde(deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub table: Vec<Table>,
    #[serde(deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub action: Vec<Action>,
    #[serde(deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub outro: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_direction: Option<TextDirection>,
}

impl EmailBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = Some(greeting.into());
        self
    }

    pub fn signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Appends an intro paragraph.
    pub fn intro(mut self, line: impl Into<String>) -> Self {
        self.intro.push(line.into());
        self
    }

    /// Appends a dictionary entry. Repeating a key replaces its value in place.
    pub fn entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.dictionary.insert(key.into(), value.into());
        self
    }

    pub fn table(mut self, table: Table) -> Self {
        self.table.push(table);
        self
    }

    pub fn action(mut self, action: Action) -> Self {
        self.action.push(action);
        self
    }

    /// Appends an outro paragraph.
    pub fn outro(mut self, line: impl Into<String>) -> Self {
        self.outro.push(line.into());
        self
    }

    pub fn text_direction(mut self, direction: TextDirection) -> Self {
        self.text_direction = Some(direction);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    Ltr,
    Rtl,
}

/// A call to action: an instruction line and a button.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub instructions: String,
    pub button: Button,
}

impl Action {
    pub fn new(instructions: impl Into<String>, button: Button) -> Self {
        Self {
            instructions: instructions.into(),
            button,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Button {
    pub text: String,
    pub link: String,
    /// Background colour, any CSS colour value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
}

impl Button {
    pub fn new(text: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            link: link.into(),
            color: None,
            text_color: None,
        }
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn text_color(mut self, color: impl Into<String>) -> Self {
        self.text_color = Some(color.into());
        self
    }
}

/// Tabular data. Columns are taken from the first row's keys, in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub data: Vec<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<TableColumns>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Appends a row of `(column, value)` cells.
    pub fn row<K, V>(mut self, cells: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.data.push(
            cells
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        );
        self
    }

    /// Sets a column's width (any CSS width, e.g. `"20%"`).
    pub fn width(mut self, column: impl Into<String>, width: impl Into<String>) -> Self {
        self.columns
            .get_or_insert_with(TableColumns::default)
            .custom_width
            .insert(column.into(), Value::String(width.into()));
        self
    }

    /// Sets a column's text alignment (`left`, `center` or `right`).
    pub fn align(mut self, column: impl Into<String>, alignment: impl Into<String>) -> Self {
        self.columns
            .get_or_insert_with(TableColumns::default)
            .custom_alignment
            .insert(column.into(), Value::String(alignment.into()));
        self
    }
}

/// Per-column presentation overrides, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableColumns {
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub custom_width: Map<String, Value>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub custom_alignment: Map<String, Value>,
}

fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        Many(Vec<T>),
        One(T),
    }

    Ok(match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        Some(OneOrMany::Many(items)) => items,
        Some(OneOrMany::One(item)) => vec![item],
        None => Vec::new(),
    })
}
