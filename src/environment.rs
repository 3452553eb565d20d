use std::env;

/// Retrieves an environment variable and splits it into a vector of strings based on a delimiter.
///
/// Empty segments are dropped, so an unset variable yields an empty vector.
///
/// # Arguments
/// - `var`: The name of the environment variable.
/// - `delimiter`: The character to split the environment variable's value by.
///
/// # Returns
/// - `Vec<String>`
pub fn get_env_var_as_vec(var: &str, delimiter: char) -> Vec<String> {
    env::var(var)
        .unwrap_or_default()
        .split(delimiter)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_variable_yields_empty_vec() {
        assert!(get_env_var_as_vec("TRENDWATCH_TEST_UNSET_VAR", ';').is_empty());
    }

    #[test]
    fn test_split_and_trim() {
        env::set_var("TRENDWATCH_TEST_SPLIT_VAR", "AI; 芯片 ;能源;");
        let values = get_env_var_as_vec("TRENDWATCH_TEST_SPLIT_VAR", ';');
        assert_eq!(values, vec!["AI", "芯片", "能源"]);
        env::remove_var("TRENDWATCH_TEST_SPLIT_VAR");
    }
}
