/// Reads an environment variable, falling back to `default` when it is
/// unset or not valid unicode.
///
/// Used for deploy-time overrides such as pointing the price feed at a
/// different base URL.
///
/// # Arguments
/// * `name` - The name of the environment variable to read.
/// * `default` - The value returned when the variable is not set.
pub fn env_var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}
