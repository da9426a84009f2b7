//! `${VAR}` references in configuration values.
//!
//! `${VAR}` must be set, `${VAR:-fallback}` falls back when it is unset.
//! Bare `$VAR` is literal text.

use std::env::VarError;

use crate::ConfigError;

/// Expand every `(key, value)` in place, stopping at the first unset
/// variable. `key` is the dotted config key reported on failure.
pub(crate) fn expand_fields<'a, F, L>(fields: F, mut lookup: L) -> Result<(), ConfigError>
where
    F: IntoIterator<Item = (&'static str, &'a mut String)>,
    L: FnMut(&str) -> Result<String, VarError>,
{
    for (key, value) in fields {
        if !value.contains("${") {
            continue;
        }
        let expanded = shellexpand::env_with_context(value.as_str(), |var| lookup(var).map(Some))
            .map_err(|e| ConfigError::EnvVar {
                key,
                var: e.var_name,
                source: e.cause,
            })?
            .into_owned();
        *value = expanded;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn env(var: &str) -> Result<String, VarError> {
        match var {
            "SAMPLES_ROOT" => Ok("/srv/samples".to_owned()),
            _ => Err(VarError::NotPresent),
        }
    }

    #[test]
    fn test_expands_each_field() {
        let mut dir = "${SAMPLES_ROOT}/dotnet".to_owned();
        let mut prefix = "${TAB_PREFIX:-tabs_}".to_owned();
        let mut plain = "$SAMPLES_ROOT stays".to_owned();
        expand_fields(
            [
                ("snippets.source_dir", &mut dir),
                ("tabs.id_prefix", &mut prefix),
                ("snippets.not_found_message", &mut plain),
            ],
            env,
        )
        .unwrap();

        assert_eq!(dir, "/srv/samples/dotnet");
        assert_eq!(prefix, "tabs_");
        assert_eq!(plain, "$SAMPLES_ROOT stays");
    }

    #[test]
    fn test_unset_variable_reports_key_and_variable() {
        let mut dir = "${SAMPLES_ROOT}".to_owned();
        let mut prefix = "${TAB_PREFIX}_".to_owned();
        let err = expand_fields(
            [("snippets.source_dir", &mut dir), ("tabs.id_prefix", &mut prefix)],
            env,
        )
        .unwrap_err();

        match &err {
            ConfigError::EnvVar { key, var, .. } => {
                assert_eq!(*key, "tabs.id_prefix");
                assert_eq!(var, "TAB_PREFIX");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(dir, "/srv/samples");
        assert_eq!(prefix, "${TAB_PREFIX}_");
    }
}
