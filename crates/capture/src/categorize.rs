//! Tool categorization by naming convention and runtime origin tags.

use std::collections::HashSet;

use actiontrail_core::ToolCategory;

/// Infer where a tool came from.
///
/// The builtin set wins over everything; after that, an explicit
/// server-origin tag, an `mcp_` prefix, or server dot-notation in the name
/// marks the tool as MCP-dispatched.
pub fn categorize(name: &str, server_origin: bool, builtin: &HashSet<String>) -> ToolCategory {
    if builtin.contains(name) {
        ToolCategory::Builtin
    } else if server_origin || name.starts_with("mcp_") || name.contains('.') {
        ToolCategory::Mcp
    } else {
        ToolCategory::Custom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builtin_set() -> HashSet<String> {
        let config = actiontrail_runtime_config::CaptureConfig::default();
        config.tools.builtin.into_iter().collect()
    }

    #[test]
    fn known_builtin_names_are_builtin() {
        let set = builtin_set();
        assert_eq!(categorize("shell", false, &set), ToolCategory::Builtin);
        assert_eq!(categorize("calculator", false, &set), ToolCategory::Builtin);
    }

    #[test]
    fn mcp_prefix_and_dot_notation_are_mcp() {
        let set = builtin_set();
        assert_eq!(categorize("mcp_fetch", false, &set), ToolCategory::Mcp);
        assert_eq!(categorize("weather.lookup", false, &set), ToolCategory::Mcp);
    }

    #[test]
    fn server_origin_tag_is_mcp_even_without_naming_convention() {
        assert_eq!(
            categorize("lookup", true, &builtin_set()),
            ToolCategory::Mcp
        );
    }

    #[test]
    fn builtin_set_wins_over_server_origin() {
        assert_eq!(
            categorize("shell", true, &builtin_set()),
            ToolCategory::Builtin
        );
    }

    #[test]
    fn everything_else_is_custom() {
        assert_eq!(
            categorize("my_tool", false, &builtin_set()),
            ToolCategory::Custom
        );
    }
}
