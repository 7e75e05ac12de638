// ==========================================
// 语言学校教务系统 - 表单字段校验
// ==========================================
// 职责: 姓名/日期/邮箱/课程数值的格式与范围校验, 以及保存前的规范化
// 红线: 不访问数据库, 纯函数
// ==========================================

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// 姓名最大长度（字符数）
pub const MAX_NAME_CHARS: usize = 30;

/// 课程学时范围
pub const MIN_DURATION_HOURS: i32 = 10;
pub const MAX_DURATION_HOURS: i32 = 50;

/// 课程人数上限的允许范围
pub const MIN_MAX_STUDENTS: i32 = 10;
pub const MAX_MAX_STUDENTS: i32 = 30;

/// 单个字段的校验失败
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub type FieldResult<T> = Result<T, FieldViolation>;

/// 校验并规范化姓名
///
/// 规则: 去除首尾空白, 1..=30 个字符, 仅允许字母与空格;
/// 连续空白折叠为一个, 每个单词首字母大写。
pub fn normalize_name(field: &'static str, raw: &str) -> FieldResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FieldViolation::new(field, "姓名不能为空"));
    }
    if trimmed.chars().count() > MAX_NAME_CHARS {
        return Err(FieldViolation::new(
            field,
            format!("姓名最多 {} 个字符", MAX_NAME_CHARS),
        ));
    }
    if !trimmed.chars().all(|c| c.is_alphabetic() || c.is_whitespace()) {
        return Err(FieldViolation::new(field, "姓名只能包含字母和空格"));
    }

    Ok(title_case(trimmed))
}

/// 单词首字母大写, 其余小写
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(|c| c.to_lowercase()))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// 校验日期落在闭区间内
pub fn check_date_range(
    field: &'static str,
    date: NaiveDate,
    min: NaiveDate,
    max: NaiveDate,
) -> FieldResult<()> {
    if date < min || date > max {
        return Err(FieldViolation::new(
            field,
            format!("日期必须在 {} 与 {} 之间", min, max),
        ));
    }
    Ok(())
}

/// 校验并规范化邮箱（转小写）
///
/// 只做形状检查: local@domain.tld, 顶级域至少 2 个字母
pub fn normalize_email(field: &'static str, raw: &str) -> FieldResult<String> {
    let email = raw.trim().to_lowercase();
    let invalid = || FieldViolation::new(field, "邮箱格式不正确");

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || !local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "._%+-".contains(c))
    {
        return Err(invalid());
    }

    let (host, tld) = domain.rsplit_once('.').ok_or_else(invalid)?;
    if host.is_empty()
        || !host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || ".-".contains(c))
        || tld.len() < 2
        || !tld.chars().all(|c| c.is_ascii_alphabetic())
    {
        return Err(invalid());
    }

    Ok(email)
}

/// 校验整数落在闭区间内
pub fn check_int_range(field: &'static str, value: i32, min: i32, max: i32) -> FieldResult<()> {
    if value < min || value > max {
        return Err(FieldViolation::new(
            field,
            format!("取值必须在 {} 与 {} 之间", min, max),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name_title_cases() {
        assert_eq!(
            normalize_name("name", "  maria   da silva ").unwrap(),
            "Maria Da Silva"
        );
        assert_eq!(normalize_name("name", "JOÃO").unwrap(), "João");
    }

    #[test]
    fn test_normalize_name_rejects_bad_input() {
        assert!(normalize_name("name", "   ").is_err());
        assert!(normalize_name("name", "R2D2").is_err());
        assert!(normalize_name("name", &"a".repeat(31)).is_err());
        assert!(normalize_name("name", &"a".repeat(30)).is_ok());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(
            normalize_email("email", " Ana.Lima@School.COM ").unwrap(),
            "ana.lima@school.com"
        );
        assert!(normalize_email("email", "ana.lima").is_err());
        assert!(normalize_email("email", "@school.com").is_err());
        assert!(normalize_email("email", "ana@school.c").is_err());
        assert!(normalize_email("email", "ana@.com").is_err());
    }

    #[test]
    fn test_ranges() {
        let min = NaiveDate::from_ymd_opt(1950, 1, 1).unwrap();
        let max = NaiveDate::from_ymd_opt(2015, 12, 31).unwrap();
        assert!(check_date_range("birth_date", min, min, max).is_ok());
        assert!(check_date_range("birth_date", NaiveDate::from_ymd_opt(2016, 1, 1).unwrap(), min, max).is_err());

        assert!(check_int_range("max_students", 10, MIN_MAX_STUDENTS, MAX_MAX_STUDENTS).is_ok());
        assert!(check_int_range("max_students", 31, MIN_MAX_STUDENTS, MAX_MAX_STUDENTS).is_err());
    }
}
