//! `render`: print the composed sequence of a machine.
use std::io::Write;

use anyhow::Result;

use crate::cli::{Format, GlobalOpts, RenderOpts};
use crate::provision;

/// Compose the machine's sequence and write it to `out`.
///
/// # Errors
///
/// Returns an error if the settings cannot be loaded or `out` cannot be
/// written.
pub fn run(global: &GlobalOpts, opts: &RenderOpts, out: &mut impl Write) -> Result<()> {
    let mut provisioner = super::setup(global, &opts.machine)?;
    let summary = provision::provision(&mut provisioner);
    provisioner
        .log()
        .info(&format!("{} actions ({summary})", provisioner.command().len()));

    match opts.format {
        Format::Script => out.write_all(provisioner.render().as_bytes())?,
        Format::Json => writeln!(out, "{}", provisioner.command().to_json()?)?,
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::test_helpers::write_temp_settings;

    fn render(format: Format) -> String {
        let (dir, _) = write_temp_settings("web", "os: ubuntu\npackages: [git]\n");
        let global = GlobalOpts {
            root: Some(dir.path().to_path_buf()),
        };
        let opts = RenderOpts {
            machine: "web".to_string(),
            format,
        };
        let mut out = Vec::new();
        run(&global, &opts, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn renders_script() {
        let script = render(Format::Script);
        assert!(script.starts_with("#!/usr/bin/env bash\n"));
        assert!(script.contains("echo 'Installing: git ...'"));
    }

    #[test]
    fn renders_json() {
        let json: serde_json::Value = serde_json::from_str(&render(Format::Json)).unwrap();
        let actions = json.as_array().unwrap();
        assert_eq!(actions.first().unwrap()["kind"], "message");
    }
}
