use indicatif::ProgressStyle;
use regex::Regex;

/// 数据集扫描使用的进度条样式
pub fn pb_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
    )
    .expect("failed to build progress style")
    .progress_chars("#>-")
}

/// 根据逗号分隔的后缀列表构建大小写不敏感的匹配正则
pub fn suffix_regex(suffix: &str) -> Regex {
    let pattern = format!("(?i)^({})$", suffix.replace(',', "|"));
    Regex::new(&pattern).expect("failed to build regex")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_regex_case_insensitive() {
        let re = suffix_regex("jpg,jpeg,png");
        assert!(re.is_match("jpg"));
        assert!(re.is_match("PNG"));
        assert!(re.is_match("JpEg"));
        assert!(!re.is_match("txt"));
        assert!(!re.is_match("jpgx"));
    }
}
