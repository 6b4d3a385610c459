use crate::models::{ItemUpdate, NewItem, ShoppingListItem, DEFAULT_QUANTITY};

/// Item fields as the user typed them, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemDraft {
  pub name: String,
  pub quantity: String,
  pub unit: String,
}

impl ItemDraft {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      ..Default::default()
    }
  }

  /// Parse prompt input of the form `name[, quantity[, unit]]`.
  ///
  /// `\,` is a literal comma and `\\` a literal backslash. The unit takes
  /// everything after the second separator, so unescaped commas in the unit
  /// survive too.
  pub fn parse(input: &str) -> Self {
    let mut fields: Vec<String> = Vec::with_capacity(3);
    let mut current = String::new();
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
      match c {
        '\\' => current.push(chars.next().unwrap_or('\\')),
        ',' if fields.len() < 2 => fields.push(std::mem::take(&mut current)),
        c => current.push(c),
      }
    }
    fields.push(current);

    let mut fields = fields.into_iter().map(|f| f.trim().to_string());
    Self {
      name: fields.next().unwrap_or_default(),
      quantity: fields.next().unwrap_or_default(),
      unit: fields.next().unwrap_or_default(),
    }
  }

  /// Inverse of [`ItemDraft::parse`], used to prefill the edit prompt.
  pub fn to_input(&self) -> String {
    let (name, quantity, unit) = (
      escape(&self.name),
      escape(&self.quantity),
      escape(&self.unit),
    );
    match (self.quantity.is_empty(), self.unit.is_empty()) {
      (true, true) => name,
      (false, true) => format!("{}, {}", name, quantity),
      _ => format!("{}, {}, {}", name, quantity, unit),
    }
  }

  /// Trimmed name, or `None` when it is blank.
  fn valid_name(&self) -> Option<String> {
    let name = self.name.trim();
    (!name.is_empty()).then(|| name.to_string())
  }

  /// Create request for this draft. `None` means nothing should be sent.
  pub fn to_new_item(&self) -> Option<NewItem> {
    Some(NewItem {
      name: self.valid_name()?,
      quantity: Some(match self.quantity.trim() {
        "" => DEFAULT_QUANTITY.to_string(),
        q => q.to_string(),
      }),
      unit: Some(self.unit.trim().to_string()),
      checked: Some(false),
    })
  }

  /// Full update record for an edit, keeping the item's checked state.
  /// Unlike create, a blank quantity is sent as is.
  pub fn to_update(&self, checked: bool) -> Option<ItemUpdate> {
    Some(ItemUpdate {
      name: self.valid_name()?,
      quantity: self.quantity.trim().to_string(),
      unit: self.unit.trim().to_string(),
      checked,
    })
  }
}

fn escape(field: &str) -> String {
  field.replace('\\', "\\\\").replace(',', "\\,")
}

impl From<&ShoppingListItem> for ItemDraft {
  fn from(item: &ShoppingListItem) -> Self {
    Self {
      name: item.name.clone(),
      quantity: item.quantity.clone(),
      unit: item.unit.clone(),
    }
  }
}
