// Option lookup with declared defaults

use crate::config::{GameConfig, OptionValue, Section};
use crate::runner::types::OptionDescriptor;

/// Value of `key` in `section`, or the default declared in `schema`.
pub fn option_value<'a>(
    config: &'a GameConfig,
    section: Section,
    schema: &'a [OptionDescriptor],
    key: &str,
) -> Option<&'a OptionValue> {
    config.get(section, key).or_else(|| {
        schema
            .iter()
            .find(|o| o.key == key)
            .and_then(|o| o.default.as_ref())
    })
}

pub fn option_bool(
    config: &GameConfig,
    section: Section,
    schema: &[OptionDescriptor],
    key: &str,
) -> bool {
    option_value(config, section, schema, key).is_some_and(OptionValue::as_bool)
}

/// Text value of an option. Empty strings count as unset.
pub fn option_str<'a>(
    config: &'a GameConfig,
    section: Section,
    schema: &'a [OptionDescriptor],
    key: &str,
) -> Option<&'a str> {
    option_value(config, section, schema, key)
        .and_then(OptionValue::as_str)
        .filter(|s| !s.is_empty())
}

/// Shell-split command line arguments stored in a text option.
pub fn option_args(
    config: &GameConfig,
    section: Section,
    schema: &[OptionDescriptor],
    key: &str,
) -> Vec<String> {
    let Some(value) = option_str(config, section, schema, key) else {
        return Vec::new();
    };
    shlex::split(value).unwrap_or_else(|| {
        tracing::warn!(key, value, "Unbalanced quotes in arguments, splitting on whitespace");
        value.split_whitespace().map(str::to_string).collect()
    })
}

/// Options every runner understands, under the `system` section.
pub fn default_system_options() -> Vec<OptionDescriptor> {
    vec![
        OptionDescriptor::path("game_path", "Default installation folder")
            .with_help("The default folder where you install your games."),
        OptionDescriptor::boolean("disable_runtime", "Disable the bundled runtime", false)
            .with_help("Run games with the system libraries only."),
        OptionDescriptor::string("exclude_processes", "Exclude processes", None).with_help(
            "Processes that should not be watched when deciding whether the game is still running. \
             Quote names containing spaces.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Vec<OptionDescriptor> {
        vec![
            OptionDescriptor::boolean("hwaccel", "Hardware acceleration", false),
            OptionDescriptor::string("args", "Arguments", Some("")),
            OptionDescriptor::choice("arch", "Arch", &[("Auto", "auto")], Some("auto")),
        ]
    }

    #[test]
    fn explicit_value_beats_default() {
        let mut config = GameConfig::default();
        assert!(!option_bool(&config, Section::Runner, &schema(), "hwaccel"));
        config.set(Section::Runner, "hwaccel", true);
        assert!(option_bool(&config, Section::Runner, &schema(), "hwaccel"));
    }

    #[test]
    fn args_are_shell_split() {
        let mut config = GameConfig::default();
        assert!(option_args(&config, Section::Game, &schema(), "args").is_empty());
        config.set(Section::Game, "args", r#"-launch "My Profile""#);
        assert_eq!(
            option_args(&config, Section::Game, &schema(), "args"),
            vec!["-launch", "My Profile"]
        );
    }

    #[test]
    fn empty_and_unknown_are_unset() {
        let config = GameConfig::default();
        assert_eq!(option_str(&config, Section::Game, &schema(), "args"), None);
        assert_eq!(option_str(&config, Section::Game, &schema(), "nope"), None);
        assert_eq!(option_str(&config, Section::Game, &schema(), "arch"), Some("auto"));
    }
}
