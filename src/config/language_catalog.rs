// ==========================================
// 语言学校教务系统 - 可开课语言目录
// ==========================================
// 职责: 课程语言必须取自固定目录; 匹配忽略大小写, 统一为目录中的标准拼写
// 存储: config_kv key = language_catalog (JSON 字符串数组), 缺省使用内置目录
// ==========================================

use serde::{Deserialize, Serialize};

/// 内置语言目录
pub const DEFAULT_LANGUAGES: &[&str] = &[
    "Arabic", "Bulgarian", "Croatian", "Czech", "Danish", "Dutch", "English", "Finnish",
    "French", "German", "Greek", "Hebrew", "Hindi", "Hungarian", "Indonesian", "Italian",
    "Japanese", "Korean", "Mandarin", "Norwegian", "Polish", "Portuguese", "Romanian",
    "Russian", "Slovak", "Spanish", "Swahili", "Swedish", "Thai", "Turkish", "Vietnamese",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageCatalog {
    languages: Vec<String>,
}

impl Default for LanguageCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGES.iter().map(|s| s.to_string()).collect())
    }
}

impl LanguageCatalog {
    /// 以给定列表构建目录（去除空白项与大小写重复项）
    pub fn new(languages: Vec<String>) -> Self {
        let mut out: Vec<String> = Vec::with_capacity(languages.len());
        for lang in languages {
            let lang = lang.trim().to_string();
            if lang.is_empty() || out.iter().any(|l| l.to_lowercase() == lang.to_lowercase()) {
                continue;
            }
            out.push(lang);
        }
        Self { languages: out }
    }

    /// 从 JSON 数组解析
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let languages: Vec<String> = serde_json::from_str(raw)?;
        Ok(Self::new(languages))
    }

    /// 解析为目录中的标准拼写（忽略大小写与首尾空白）
    pub fn canonical(&self, language: &str) -> Option<&str> {
        let needle = language.trim().to_lowercase();
        self.languages
            .iter()
            .find(|l| l.to_lowercase() == needle)
            .map(|l| l.as_str())
    }

    pub fn contains(&self, language: &str) -> bool {
        self.canonical(language).is_some()
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_ignores_case() {
        let catalog = LanguageCatalog::default();
        assert_eq!(catalog.canonical("spanish"), Some("Spanish"));
        assert_eq!(catalog.canonical("  JAPANESE "), Some("Japanese"));
        assert_eq!(catalog.canonical("Klingon"), None);
    }

    #[test]
    fn test_from_json_dedups() {
        let catalog = LanguageCatalog::from_json(r#"["Esperanto", "esperanto", " ", "Latin"]"#).unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains("LATIN"));
    }
}
