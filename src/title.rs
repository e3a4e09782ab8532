//! Display titles derived from SVG file names

use crate::config::Config;
use crate::walker::StyleContext;

/// Derive the library title for an icon from its file stem
///
/// The steps run in a fixed order, each on the output of the previous one:
/// 1. remove the first occurrence of the subvariant (if `hide_subvariant`)
/// 2. apply the style's [`TitleRule`](crate::TitleRule) (if `title_cleanup`)
/// 3. turn underscores into spaces
/// 4. trim surrounding whitespace
///
/// The result may be empty.
pub fn derive_title(stem: &str, context: &StyleContext, config: &Config) -> String {
    let mut title = stem.to_string();

    if config.hide_subvariant {
        if let Some(subvariant) = &context.subvariant {
            title = title.replacen(subvariant.as_str(), "", 1);
        }
    }

    if config.title_cleanup {
        if let Some(rule) = config.rule_for(&context.style) {
            title = rule.apply(&title);
        }
    }

    title.replace('_', " ").trim().to_string()
}
