use serde::Deserialize;
use std::collections::BTreeMap;

/// 表单解码后的扁平字段：字段名 → 一个或多个值
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    fields: BTreeMap<String, Vec<String>>,
}

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个值（同名字段可以有多个值）
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.entry(name.into()).or_default().push(value.into());
    }

    /// 字段的第一个值
    pub fn first(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn values(&self, name: &str) -> &[String] {
        self.fields.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut form = FormFields::new();
        for (name, value) in iter {
            form.append(name, value);
        }
        form
    }
}

/// TOML 表单文件中的单个值
///
/// 选择题作答通常写成整数（`question-1 = 0`），所以整数也接受。
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Many(Vec<String>),
}

impl From<BTreeMap<String, FieldValue>> for FormFields {
    fn from(raw: BTreeMap<String, FieldValue>) -> Self {
        let mut form = FormFields::new();
        for (name, value) in raw {
            match value {
                FieldValue::Text(s) => form.append(name, s),
                FieldValue::Integer(n) => form.append(name, n.to_string()),
                FieldValue::Many(values) => {
                    // 保留空数组，表示字段存在但没有值
                    form.fields.entry(name).or_default().extend(values);
                }
            }
        }
        form
    }
}
