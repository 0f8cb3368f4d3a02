/*!
# Haskell Source Marker Rules

Rules for Haskell files that embed templates in quasi-quotes. They run in
priority order; guard resolution must come first because a GHC 6/7 guard
splits a quasi-quote opener from its body.
*/

pub mod cpp_guard;
pub mod dollar_opener;
pub mod quoted_block;
pub mod quoter_macro;

use super::TransformationRule;

// Re-export commonly used rules
pub use cpp_guard::CppGuardResolver;
pub use dollar_opener::DollarOpenerRewriter;
pub use quoted_block::QuotedBlockMigrator;
pub use quoter_macro::QuoterMacroExpander;

/// All Haskell source rules, highest priority first
pub fn default_rules() -> Vec<Box<dyn TransformationRule>> {
    vec![
        Box::new(CppGuardResolver::new()),
        Box::new(QuoterMacroExpander::new()),
        Box::new(DollarOpenerRewriter::new()),
        Box::new(QuotedBlockMigrator::new()),
    ]
}
