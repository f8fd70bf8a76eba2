//! Tool-wide defaults.
//!
//! A [`Settings`] value is constructed once and threaded explicitly through
//! every call that needs it; there is no ambient global state.

/// Defaults used when filling configurations and build files.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Framework identifier written into the user config.
    pub framework: String,

    /// Minimum CMake version declared in generated build files.
    pub cmake_version: String,

    /// C++ standard for generated build files.
    pub cxx_standard: String,

    /// Arduino IDE version substituted into platform flag templates
    /// (`{{runtime.ide.version}}`).
    pub arduino_version: String,

    /// Whether `compiler.*.extra_flags` lines are included.
    pub include_extra_flags: bool,

    /// Default serial baud rate.
    pub default_baud: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            framework: "cosa".to_string(),
            cmake_version: "3.1.0".to_string(),
            cxx_standard: "11".to_string(),
            arduino_version: "10605".to_string(),
            include_extra_flags: true,
            default_baud: 9600,
        }
    }
}
