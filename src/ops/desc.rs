//! The `desc` operation: print everything known about one target.
//!
//! This is the query the server answers remotely and the CLI runs
//! locally. Output is line-oriented so it can be consumed by scripts;
//! passing a section name narrows the output to that section's values.

use anyhow::{bail, Context, Result};

use crate::core::label::Label;
use crate::core::source_dir::SourceDir;
use crate::core::target::Target;
use crate::core::workspace::Workspace;
use crate::resolved::ResolvedTargetData;

/// Run a description query. `args[0]` is the target label; an optional
/// `args[1]` selects a single section.
pub fn run_desc<'g>(
    args: &[String],
    workspace: &'g Workspace,
    data: &ResolvedTargetData<'g>,
) -> Result<()> {
    let Some(label_arg) = args.first() else {
        bail!("desc requires a target label\nhelp: slipway desc //dir:name [section]");
    };

    let default_toolchain = workspace.default_toolchain();
    let label = Label::resolve(SourceDir::root(), default_toolchain, label_arg)
        .with_context(|| format!("bad target label `{label_arg}`"))?;

    let target = workspace.graph().target(&label).with_context(|| {
        format!(
            "target `{}` not found\nhelp: run `slipway ls` to see all targets",
            label.user_visible_name_with_default(default_toolchain)
        )
    })?;

    let desc = Desc { workspace, data, target };
    match args.get(1).map(String::as_str) {
        None => desc.print_all(),
        Some(section) => desc.print_section(section),
    }
}

struct Desc<'a, 'g> {
    workspace: &'g Workspace,
    data: &'a ResolvedTargetData<'g>,
    target: &'g Target,
}

impl Desc<'_, '_> {
    fn print_all(&self) -> Result<()> {
        let tc = self.workspace.default_toolchain();
        println!("{}", self.target.label().user_visible_name_with_default(tc));
        println!("  type: {}", self.target.output_type());
        println!("  toolchain: {}", self.target.label().toolchain_label());
        println!("  lang: {}", self.target.lang().as_str());
        if self.target.hard_dep() {
            println!("  hard_dep: true");
        }

        for section in [
            "deps",
            "libs",
            "lib_dirs",
            "frameworks",
            "weak_frameworks",
            "framework_dirs",
            "inherited_libraries",
            "hard_deps",
        ] {
            self.print_titled(section)?;
        }
        if self.target.is_rust() {
            self.print_titled("rust_libs")?;
        }
        Ok(())
    }

    fn print_titled(&self, section: &str) -> Result<()> {
        let lines = self.section_lines(section)?;
        if !lines.is_empty() {
            println!("\n{section}:");
            for line in lines {
                println!("  {line}");
            }
        }
        Ok(())
    }

    fn print_section(&self, section: &str) -> Result<()> {
        for line in self.section_lines(section)? {
            println!("{line}");
        }
        Ok(())
    }

    fn section_lines(&self, section: &str) -> Result<Vec<String>> {
        let tc = self.workspace.default_toolchain();
        let show = |label: &Label| label.user_visible_name_with_default(tc);

        let lines = match section {
            "type" => vec![self.target.output_type().to_string()],
            "lang" => vec![self.target.lang().as_str().to_string()],
            "toolchain" => vec![self.target.label().toolchain_label().to_string()],
            "deps" => {
                let mut out = Vec::new();
                for (dep, is_public) in self.target.link_deps() {
                    out.push(format!(
                        "{} ({})",
                        show(&dep),
                        if is_public { "public" } else { "private" }
                    ));
                }
                for dep in self.target.data_deps() {
                    out.push(format!("{} (data)", show(dep)));
                }
                out
            }
            "libs" => self
                .data
                .all_libs(self.target)?
                .iter()
                .map(|l| l.value().to_string())
                .collect(),
            "lib_dirs" => self
                .data
                .all_lib_dirs(self.target)?
                .iter()
                .map(|d| d.value().to_string())
                .collect(),
            "frameworks" => self
                .data
                .all_frameworks(self.target)?
                .iter()
                .map(|f| f.to_string())
                .collect(),
            "weak_frameworks" => self
                .data
                .all_weak_frameworks(self.target)?
                .iter()
                .map(|f| f.to_string())
                .collect(),
            "framework_dirs" => self
                .data
                .all_framework_dirs(self.target)?
                .iter()
                .map(|d| d.value().to_string())
                .collect(),
            "inherited_libraries" => self
                .data
                .inherited_libraries(self.target)?
                .iter()
                .map(|pair| {
                    format!(
                        "{} ({})",
                        show(&pair.target().label()),
                        if pair.is_public() { "public" } else { "private" }
                    )
                })
                .collect(),
            "rust_libs" => self
                .data
                .rust_transitive_inherited_libs(self.target)?
                .iter()
                .map(|pair| show(&pair.target().label()))
                .collect(),
            "hard_deps" => {
                let set = self.data.recursive_hard_deps(self.target)?;
                let mut labels: Vec<_> = set.iter().copied().collect();
                labels.sort();
                labels.iter().map(show).collect()
            }
            other => bail!(
                "unknown desc section `{other}`\n\
                 help: one of type, lang, toolchain, deps, libs, lib_dirs, frameworks, \
                 weak_frameworks, framework_dirs, inherited_libraries, rust_libs, hard_deps"
            ),
        };
        Ok(lines)
    }
}
