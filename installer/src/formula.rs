//! Homebrew formula rendering.
//!
//! The formula is generated from the same catalog the installer uses, so the
//! URLs and checksums Homebrew users fetch are exactly the ones the installer
//! verifies. Per OS block, each CPU branch either carries a `url`/`sha256`
//! pair or an `odie` naming the missing package.

use crate::artefact::platform::{Arch, Os, Platform};
use crate::catalog::{Artefact, Release, ReleaseCatalog};

const INDENT: &str = "  ";

/// Render the Homebrew formula for `release`.
///
/// # Examples
///
/// ```
/// use oclean_installer::catalog::ReleaseCatalog;
/// use oclean_installer::formula::render_formula;
///
/// let catalog = ReleaseCatalog::embedded().expect("catalog");
/// let release = catalog.latest().expect("latest");
/// let formula = render_formula(&catalog, release);
/// assert!(formula.starts_with("class Oclean < Formula"));
/// assert!(formula.contains("odie \"x86_64 macOS package is not published yet\""));
/// ```
#[must_use]
pub fn render_formula(catalog: &ReleaseCatalog, release: &Release) -> String {
    let mut lines = vec![
        "class Oclean < Formula".to_owned(),
        format!("{INDENT}desc {}", quote(catalog.description())),
        format!("{INDENT}homepage {}", quote(catalog.homepage())),
        format!("{INDENT}version {}", quote(&release.version().to_string())),
        String::new(),
    ];
    lines.extend(os_block(release, Os::MacOs));
    lines.push(String::new());
    lines.extend(os_block(release, Os::Linux));
    lines.extend(
        [
            "",
            "  def install",
            "    bin.install \"oclean\"",
            "  end",
            "",
            "  test do",
            "    output = shell_output(\"#{bin}/oclean --version\")",
            "    assert_match(/\\d+\\.\\d+\\.\\d+/, output)",
            "  end",
            "end",
        ]
        .map(str::to_owned),
    );
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// The `on_macos`/`on_linux` block for one operating system.
fn os_block(release: &Release, os: Os) -> Vec<String> {
    let block = match os {
        Os::MacOs => "on_macos",
        Os::Linux => "on_linux",
    };
    let artefact_for =
        |arch| release.artefact_for(&Platform::new(os, arch).target_triple());
    let arm = artefact_for(Arch::Aarch64);
    let intel = artefact_for(Arch::X86_64);

    let body_indent = INDENT.repeat(2);
    let branch_indent = INDENT.repeat(3);
    let mut lines = vec![format!("{INDENT}{block} do")];
    match (arm, intel) {
        (Some(arm), Some(intel)) => {
            lines.push(format!("{body_indent}if Hardware::CPU.arm?"));
            lines.extend(artefact_lines(arm, &branch_indent));
            lines.push(format!("{body_indent}else"));
            lines.extend(artefact_lines(intel, &branch_indent));
            lines.push(format!("{body_indent}end"));
        }
        (Some(present), None) | (None, Some(present)) => {
            let (guard, missing) = if arm.is_some() {
                ("arm?", Arch::X86_64)
            } else {
                ("intel?", Arch::Aarch64)
            };
            lines.push(format!("{body_indent}if Hardware::CPU.{guard}"));
            lines.extend(artefact_lines(present, &branch_indent));
            lines.push(format!("{body_indent}else"));
            lines.push(format!(
                "{branch_indent}odie {}",
                quote(&format!(
                    "{} {} package is not published yet",
                    missing.as_str(),
                    os.display_name()
                ))
            ));
            lines.push(format!("{body_indent}end"));
        }
        (None, None) => {
            lines.push(format!(
                "{body_indent}odie {}",
                quote(&format!(
                    "{} package is not published yet",
                    os.display_name()
                ))
            ));
        }
    }
    lines.push(format!("{INDENT}end"));
    lines
}

fn artefact_lines(artefact: &Artefact, indent: &str) -> [String; 2] {
    [
        format!("{indent}url {}", quote(artefact.url())),
        format!("{indent}sha256 {}", quote(artefact.sha256().as_str())),
    ]
}

/// Ruby double-quoted string literal.
fn quote(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('#', "\\#");
    format!("\"{escaped}\"")
}
