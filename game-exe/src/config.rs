//! User configuration options.

use crate::{CLIOptions, BASE_DIR};
use dirs::config_dir;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::{
    fs::{create_dir_all, File, OpenOptions},
    io::{self, Read, Write},
    path::PathBuf,
};

const LOG_TAG: &str = "UserConfig";

fn get_cfg_file() -> io::Result<PathBuf> {
    let mut dir = config_dir().ok_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "Couldn't find user config dir")
    })?;
    dir.push(BASE_DIR);
    if !dir.exists() {
        create_dir_all(&dir)?;
    }
    dir.push("user.toml");
    Ok(dir)
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    pub iwad: String,
    pub width: u32,
    pub height: u32,
    pub true_colour: bool,
    pub column_batching: bool,
}

impl UserConfig {
    /// Read the config, writing out a default one if it is missing or can't
    /// be parsed
    pub fn load() -> io::Result<Self> {
        let path = get_cfg_file()?;

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;
        let mut buf = String::new();
        if file.read_to_string(&mut buf)? == 0 {
            return UserConfig::create_default(&mut file);
        }
        match toml::from_str(&buf) {
            Ok(data) => {
                info!(target: LOG_TAG, "Loaded user config file");
                Ok(data)
            }
            Err(e) => {
                warn!(target: LOG_TAG, "Could not deserialise {path:?}, recreating config: {e}");
                let mut file = File::create(&path)?;
                UserConfig::create_default(&mut file)
            }
        }
    }

    fn create_default(file: &mut File) -> io::Result<Self> {
        let config = UserConfig::default_sized();
        let data = toml::to_string(&config)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        file.write_all(data.as_bytes())?;
        info!(target: LOG_TAG, "Created default user config file");
        Ok(config)
    }

    fn default_sized() -> Self {
        UserConfig {
            width: 640,
            height: 400,
            ..UserConfig::default()
        }
    }

    pub fn write(&self) {
        let write = || -> io::Result<()> {
            let data = toml::to_string_pretty(self)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            File::create(get_cfg_file()?)?.write_all(data.as_bytes())
        };
        if let Err(err) = write() {
            error!(target: LOG_TAG, "Could not write config: {err}");
        }
    }

    /// Sync the CLI options and UserOptions with each other
    pub fn sync_cli(&mut self, cli: &mut CLIOptions) {
        info!(target: LOG_TAG, "Checking CLI options");

        if !cli.iwad.is_empty() && cli.iwad != self.iwad {
            cli.iwad.clone_into(&mut self.iwad);
            info!("IWAD changed to: {}", &cli.iwad);
        } else {
            self.iwad.clone_into(&mut cli.iwad);
        }

        if cli.width != 0 {
            self.width = cli.width;
        } else {
            cli.width = self.width;
        }

        if cli.height != 0 {
            self.height = cli.height;
        } else {
            cli.height = self.height;
        }

        if let Some(f) = cli.true_colour {
            self.true_colour = f;
        } else {
            cli.true_colour = Some(self.true_colour);
        }

        if let Some(f) = cli.batch {
            self.column_batching = f;
        } else {
            cli.batch = Some(self.column_batching);
        }
    }
}
