use std::collections::HashMap;
use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use tracing::{
  debug,
  info,
  trace,
  warn
};

use crate::navigation::ViewMode;

const RC_ENV_VAR: &str = "CADENCERC";
const RC_FILE_NAME: &str = ".cadencerc";
const DEFAULT_REVEAL_INTERVAL_MS: u64 =
  30;

#[derive(Debug, Clone)]
pub struct Config {
  map: HashMap<String, String>,
  pub loaded_files: Vec<PathBuf>
}

impl Config {
  /// Built-in defaults with no rc file
  /// applied.
  pub fn defaults() -> Self {
    let mut map = HashMap::new();
    map.insert(
      "data.location".to_string(),
      "~/.cadence".to_string()
    );
    map.insert(
      "default.view".to_string(),
      "month".to_string()
    );
    map.insert(
      "color".to_string(),
      "on".to_string()
    );
    map.insert(
      "reveal.interval_ms".to_string(),
      DEFAULT_REVEAL_INTERVAL_MS
        .to_string()
    );

    Self {
      map,
      loaded_files: vec![]
    }
  }

  #[tracing::instrument(skip(
    rc_override
  ))]
  pub fn load(
    rc_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg = Self::defaults();

    let rc =
      resolve_rc_path(rc_override)?;
    if let Some(path) = rc {
      info!(rc = %path.display(), "loading cadencerc");
      cfg.load_file(&path)?;
    } else {
      debug!(
        "no cadencerc found; using \
         defaults"
      );
    }

    Ok(cfg)
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (k, v) in overrides {
      let key = k
        .strip_prefix("rc.")
        .unwrap_or(&k)
        .to_string();
      debug!(key = %key, value = %v, "applying override");
      self.map.insert(key, v);
    }
  }

  pub fn get(
    &self,
    key: &str
  ) -> Option<String> {
    self.map.get(key).cloned()
  }

  /// `None` when unset; an error when the
  /// value is not a recognised boolean.
  pub fn get_bool(
    &self,
    key: &str
  ) -> anyhow::Result<Option<bool>> {
    let Some(raw) = self.map.get(key)
    else {
      return Ok(None);
    };
    parse_bool(raw).map(Some).ok_or_else(
      || {
        anyhow!(
          "invalid {key} setting: {raw} \
           (expected on/off, yes/no, \
           true/false or 1/0)"
        )
      }
    )
  }

  pub fn default_view(
    &self
  ) -> anyhow::Result<ViewMode> {
    self
      .get("default.view")
      .as_deref()
      .unwrap_or("month")
      .parse()
      .context(
        "invalid default.view setting"
      )
  }

  pub fn reveal_interval_ms(
    &self
  ) -> anyhow::Result<u64> {
    let Some(raw) =
      self.get("reveal.interval_ms")
    else {
      return Ok(
        DEFAULT_REVEAL_INTERVAL_MS
      );
    };
    raw.trim().parse().with_context(
      || {
        format!(
          "invalid reveal.interval_ms \
           setting: {raw}"
        )
      }
    )
  }

  #[tracing::instrument(skip(self))]
  fn load_file(
    &mut self,
    path: &Path
  ) -> anyhow::Result<()> {
    let path = expand_tilde(path);
    let text =
      fs::read_to_string(&path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;
    self
      .loaded_files
      .push(path.clone());

    let base_dir = path
      .parent()
      .unwrap_or_else(|| Path::new("."))
      .to_path_buf();

    for (idx, raw_line) in
      text.lines().enumerate()
    {
      let location = format!(
        "{}:{}",
        path.display(),
        idx + 1
      );
      match RcLine::parse(raw_line)
        .with_context(|| {
          format!(
            "invalid config line \
             {location}"
          )
        })? {
        | RcLine::Blank => {}
        | RcLine::Include(target) => {
          self.include(
            &base_dir, target, &location
          )?;
        }
        | RcLine::Setting(key, value) => {
          trace!(%location, key, value, "rc setting");
          self.map.insert(
            key.to_string(),
            value.to_string()
          );
        }
      }
    }

    Ok(())
  }

  fn include(
    &mut self,
    base_dir: &Path,
    target: &str,
    location: &str
  ) -> anyhow::Result<()> {
    let include_path =
      resolve_include_path(
        base_dir, target
      )?;
    debug!(
      %location,
      include = %include_path.display(),
      "processing include"
    );

    if self
      .loaded_files
      .contains(&include_path)
    {
      warn!(include = %include_path.display(), "include cycle detected; skipping");
      return Ok(());
    }
    if !include_path.exists() {
      warn!(include = %include_path.display(), "include file does not exist; skipping");
      return Ok(());
    }
    self.load_file(&include_path)
  }
}

/// One rc line after comment stripping.
#[derive(Debug, PartialEq, Eq)]
enum RcLine<'a> {
  Blank,
  Include(&'a str),
  Setting(&'a str, &'a str)
}

impl<'a> RcLine<'a> {
  fn parse(
    raw: &'a str
  ) -> anyhow::Result<Self> {
    let line = raw
      .split_once('#')
      .map_or(raw, |(before, _)| before)
      .trim();

    if line.is_empty() {
      return Ok(Self::Blank);
    }
    if let Some(rest) =
      line.strip_prefix("include ")
    {
      return Ok(Self::Include(
        rest.trim()
      ));
    }

    let (key, value) =
      line.split_once('=').ok_or_else(
        || anyhow!("expected key = value, got: {raw}")
      )?;
    Ok(Self::Setting(
      key.trim(),
      value.trim()
    ))
  }
}

#[tracing::instrument(skip(
  cfg,
  override_dir
))]
pub fn resolve_data_dir(
  cfg: &Config,
  override_dir: Option<&Path>
) -> anyhow::Result<PathBuf> {
  let dir = if let Some(path) =
    override_dir
  {
    path.to_path_buf()
  } else if let Some(cfg_value) =
    cfg.get("data.location")
  {
    expand_tilde(Path::new(&cfg_value))
  } else {
    default_data_dir()?
  };

  debug!(dir = %dir.display(), "resolved data directory");

  Ok(dir)
}

#[tracing::instrument(skip(
  override_path
))]
fn resolve_rc_path(
  override_path: Option<&Path>
) -> anyhow::Result<Option<PathBuf>> {
  if let Some(path) = override_path {
    return Ok(Some(path.to_path_buf()));
  }

  if let Ok(rc_env) =
    std::env::var(RC_ENV_VAR)
  {
    if rc_env == "/dev/null" {
      return Ok(None);
    }
    return Ok(Some(PathBuf::from(
      rc_env
    )));
  }

  let Some(home) = dirs::home_dir()
  else {
    warn!(
      "cannot determine home \
       directory; skipping cadencerc"
    );
    return Ok(None);
  };
  let candidate = home.join(RC_FILE_NAME);
  if candidate.exists() {
    return Ok(Some(candidate));
  }

  Ok(None)
}

fn default_data_dir()
-> anyhow::Result<PathBuf> {
  let home = dirs::home_dir()
    .ok_or_else(|| {
      anyhow!(
        "cannot determine home \
         directory"
      )
    })?;
  Ok(home.join(".cadence"))
}

fn resolve_include_path(
  base_dir: &Path,
  include: &str
) -> anyhow::Result<PathBuf> {
  if include.trim().is_empty() {
    return Err(anyhow!(
      "include path cannot be empty"
    ));
  }

  let raw = PathBuf::from(include);
  let expanded = expand_tilde(&raw);
  if expanded.is_absolute() {
    Ok(expanded)
  } else {
    Ok(base_dir.join(expanded))
  }
}

fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}

fn parse_bool(s: &str) -> Option<bool> {
  match s
    .trim()
    .to_ascii_lowercase()
    .as_str()
  {
    | "1" | "y" | "yes" | "on" | "true" => {
      Some(true)
    }
    | "0" | "n" | "no" | "off"
    | "false" => Some(false),
    | _ => None
  }
}

#[cfg(test)]
mod tests {
  use std::fs;

  use tempfile::tempdir;

  use super::{
    Config,
    RcLine
  };
  use crate::navigation::ViewMode;

  #[test]
  fn rc_file_with_include_overrides_defaults(
  ) {
    let dir = tempdir().expect("tempdir");
    let extra = dir.path().join("extra.rc");
    fs::write(
      &extra,
      "reveal.interval_ms = 5\n"
    )
    .expect("write include");

    let main = dir.path().join("main.rc");
    fs::write(
      &main,
      "# calendar prefs\n\
       default.view = week  # trailing\n\
       include extra.rc\n"
    )
    .expect("write rc");

    let cfg = Config::load(Some(&main))
      .expect("load config");
    assert_eq!(
      cfg.default_view().expect("view"),
      ViewMode::Week
    );
    assert_eq!(
      cfg
        .reveal_interval_ms()
        .expect("interval"),
      5
    );
    assert_eq!(cfg.loaded_files.len(), 2);
    assert_eq!(
      cfg.get_bool("color").expect("bool"),
      Some(true)
    );
  }

  #[test]
  fn overrides_strip_rc_prefix_and_reject_bad_values(
  ) {
    let mut cfg = Config::defaults();
    cfg.apply_overrides([(
      "rc.default.view".to_string(),
      "agenda".to_string()
    )]);
    assert!(cfg.default_view().is_err());
  }

  #[test]
  fn booleans_accept_short_forms_and_reject_others(
  ) {
    let mut cfg = Config::defaults();
    for (raw, expected) in [
      ("y", true),
      ("Off", false),
      ("0", false)
    ] {
      cfg.apply_overrides([(
        "color".to_string(),
        raw.to_string()
      )]);
      assert_eq!(
        cfg.get_bool("color").expect(raw),
        Some(expected)
      );
    }

    cfg.apply_overrides([(
      "color".to_string(),
      "sometimes".to_string()
    )]);
    assert!(cfg.get_bool("color").is_err());
    assert_eq!(
      cfg.get_bool("no.such.key").expect("unset"),
      None
    );
  }

  #[test]
  fn rc_lines_strip_comments() {
    assert_eq!(
      RcLine::parse("  # only a comment")
        .expect("comment"),
      RcLine::Blank
    );
    assert_eq!(
      RcLine::parse("color = off # quiet")
        .expect("setting"),
      RcLine::Setting("color", "off")
    );
    assert_eq!(
      RcLine::parse("include ~/shared.rc")
        .expect("include"),
      RcLine::Include("~/shared.rc")
    );
  }

  #[test]
  fn malformed_line_is_an_error() {
    let dir = tempdir().expect("tempdir");
    let rc = dir.path().join("bad.rc");
    fs::write(&rc, "just words\n")
      .expect("write rc");

    assert!(Config::load(Some(&rc)).is_err());
  }
}
