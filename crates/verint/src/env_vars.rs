/// Declares all environment variables read by `verint`.
pub(crate) struct EnvVars;

impl EnvVars {
    /// Equivalent to the `--output-format` command-line argument.
    pub(crate) const VERINT_OUTPUT_FORMAT: &'static str = "VERINT_OUTPUT_FORMAT";

    /// Equivalent to the `--no-color` command-line argument. If set, `verint` disables colors.
    pub(crate) const VERINT_NO_COLOR: &'static str = "VERINT_NO_COLOR";
}
