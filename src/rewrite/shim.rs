//! Dual-branch compatibility shim.

use crate::options::Options;

/// Wrap both call forms in a runtime version check.
///
/// The text replaces the call in place, so its first line continues whatever
/// precedes the call and every later line is prefixed with `indent`:
///
/// ```text
/// # TODO: Rails 5 autofix
/// <indent>if Fave.next_version?
/// <indent><unit><new_call>
/// <indent>else
/// <indent><unit><original_call>
/// <indent>end
/// <indent># ENDTODO
/// ```
pub fn compatibility_shim(
    original_call: &str,
    new_call: &str,
    indent: &str,
    options: &Options,
) -> String {
    let inner = format!("{}{}", indent, options.style.indent_unit);
    format!(
        "# TODO: {label} autofix\n\
         {indent}if {guard}\n\
         {inner}{new_call}\n\
         {indent}else\n\
         {inner}{original_call}\n\
         {indent}end\n\
         {indent}# ENDTODO",
        label = options.shim_label,
        guard = options.version_guard,
    )
}
