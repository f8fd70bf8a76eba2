//! Embedded project templates.
//!
//! Written out verbatim by scaffolding; `{{key}}` placeholders are filled by
//! the [`super::fill`] engine where noted.

/// Default `config.json`.
pub const USER_CONFIG: &str = r#"{
  "board": "",
  "port": "",
  "ide": "",
  "framework": "cosa",
  "build-flags": "",
  "module-flags": "",
  "cosa-libraries": ""
}
"#;

/// Starter sketch: blink the on-board LED.
pub const MAIN_CPP: &str = r#"#include "Cosa/OutputPin.hh"
#include "Cosa/Watchdog.hh"

OutputPin led(Board::LED);

void setup()
{
  Watchdog::begin();
}

void loop()
{
  led.toggle();
  Watchdog::delay(512);
}
"#;

/// `.gitignore` for plain projects.
pub const GITIGNORE_GENERAL: &str = "\
# Solder build artifacts
solder/bin/

# Package store
.pkg/

# Editor files
*.swp
*~
.vscode/
";

/// `.gitignore` for CLion projects.
pub const GITIGNORE_CLION: &str = "\
# Solder build artifacts
solder/bin/

# Package store
.pkg/

# CLion
.idea/
cmake-build-*/
CMakeListsPrivate.txt
";

/// Root `CMakeLists.txt` for CLion projects (filled).
pub const CLION_CMAKE: &str = "\
# Generated by solder for CLion integration - do not edit.
cmake_minimum_required(VERSION {{cmake-version}})
project({{project-name}})

include(CMakeListsPrivate.txt)
add_subdirectory(solder)
";

/// CLion private settings (filled, regenerated on every update).
pub const CLION_CMAKE_PRIVATE: &str = "\
# Generated by solder - regenerated on every update, do not edit.
set(SOLDER_HOME \"{{solder-home}}\")
set(PROJECT_BOARD \"{{board}}\")

include_directories(\"{{current-path}}/src\")
include_directories(\"{{current-path}}/lib\")
";
