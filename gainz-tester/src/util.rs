pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_csv_trims_and_drops_empty_entries() {
        assert_eq!(
            split_csv(" consent-tiers, ,bucketing,"),
            vec!["consent-tiers".to_string(), "bucketing".to_string()]
        );
        assert!(split_csv("").is_empty());
    }
}
