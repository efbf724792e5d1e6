//! Fallback discovery of the screenshot folder and the game install folder.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use directories::UserDirs;
use steamlocate::SteamDir;

/// Folder VRChat saves screenshots into, under the user's Pictures folder.
pub const VRCHAT_PICTURES_DIR: &str = "VRChat";
/// Folder name of VRChat under `steamapps/common`.
pub const VRCHAT_GAME_DIR: &str = "VRChat";
/// Anti-cheat folder that holds the splash screen.
pub const EAC_DIR: &str = "EasyAntiCheat";

/// Resolve the user's Pictures known folder.
pub fn pictures_dir() -> Option<PathBuf> {
    UserDirs::new().and_then(|dirs| dirs.picture_dir().map(Path::to_path_buf))
}

/// Return `<pictures>/VRChat` when that folder exists.
pub fn vrchat_pictures_dir(pictures: &Path) -> Option<PathBuf> {
    let candidate = pictures.join(VRCHAT_PICTURES_DIR);
    candidate.is_dir().then_some(candidate)
}

/// Default source folder: VRChat's screenshot folder.
pub fn default_source_dir() -> Option<PathBuf> {
    pictures_dir().and_then(|pictures| vrchat_pictures_dir(&pictures))
}

/// Default destination folder: the VRChat install, if it carries an EasyAntiCheat folder.
pub fn default_destination_dir() -> Option<PathBuf> {
    match find_steam_game_dir(VRCHAT_GAME_DIR) {
        Ok(dir) if dir.join(EAC_DIR).is_dir() => Some(dir),
        Ok(dir) => {
            log::warn!("{} has no {EAC_DIR} folder", dir.display());
            None
        }
        Err(err) => {
            log::debug!("steam lookup failed: {err:#}");
            None
        }
    }
}

/// Locate the Steam installation folder.
pub fn steam_install_dir() -> Result<PathBuf> {
    #[cfg(windows)]
    {
        match registry::steam_install_path() {
            Ok(path) => return Ok(path),
            Err(err) => log::debug!("registry lookup failed, probing default locations: {err:#}"),
        }
    }

    let steam = SteamDir::locate().context("failed to locate Steam installation")?;
    Ok(steam.path().to_path_buf())
}

/// List every library folder registered in `steamapps/libraryfolders.vdf`,
/// with the install folder first.
pub fn steam_library_dirs(install: &Path) -> Result<Vec<PathBuf>> {
    let steam = SteamDir::from_dir(install)
        .with_context(|| format!("not a Steam installation: {}", install.display()))?;
    let libraries = steam
        .libraries()
        .with_context(|| format!("failed to read library folders of {}", install.display()))?;

    let mut dirs = Vec::new();
    for library in libraries {
        match library {
            Ok(library) => dirs.push(library.path().to_path_buf()),
            Err(err) => log::warn!("skipping unreadable Steam library: {err}"),
        }
    }
    // The install folder is always searched first, whether or not it is listed.
    dirs.retain(|dir| dir != install);
    dirs.insert(0, install.to_path_buf());
    Ok(dirs)
}

/// Return the first `<library>/steamapps/common/<name>` folder that exists.
pub fn find_game_in_libraries(libraries: &[PathBuf], name: &str) -> Result<PathBuf> {
    libraries
        .iter()
        .map(|library| library.join("steamapps").join("common").join(name))
        .find(|dir| dir.is_dir())
        .ok_or_else(|| anyhow!("game directory not found for {name}"))
}

/// Find the install folder of a Steam game by its folder name.
pub fn find_steam_game_dir(name: &str) -> Result<PathBuf> {
    let install = steam_install_dir()?;
    let libraries = steam_library_dirs(&install)?;
    find_game_in_libraries(&libraries, name)
}

#[cfg(windows)]
mod registry {
    use std::path::PathBuf;

    use anyhow::{Context, Result};
    use winreg::RegKey;
    use winreg::enums::{HKEY_LOCAL_MACHINE, KEY_QUERY_VALUE};

    /// Registry key written by the Steam installer on 64-bit Windows.
    const STEAM_KEY: &str = "SOFTWARE\\Wow6432Node\\Valve\\Steam";
    const INSTALL_PATH_VALUE: &str = "InstallPath";

    pub(super) fn steam_install_path() -> Result<PathBuf> {
        let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
        let key = hklm
            .open_subkey_with_flags(STEAM_KEY, KEY_QUERY_VALUE)
            .context("failed to open Steam registry key")?;
        let path: String = key
            .get_value(INSTALL_PATH_VALUE)
            .context("failed to read Steam InstallPath")?;
        Ok(PathBuf::from(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn vrchat_pictures_dir_requires_existing_folder() {
        let dir = TempDir::new().unwrap();
        assert_eq!(vrchat_pictures_dir(dir.path()), None);

        fs::create_dir(dir.path().join("VRChat")).unwrap();
        assert_eq!(
            vrchat_pictures_dir(dir.path()),
            Some(dir.path().join("VRChat"))
        );
    }

    #[test]
    fn finds_game_in_second_library() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        let game = second.path().join("steamapps").join("common").join("VRChat");
        fs::create_dir_all(&game).unwrap();

        let libraries = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        assert_eq!(find_game_in_libraries(&libraries, "VRChat").unwrap(), game);
    }

    #[test]
    fn prefers_earlier_library() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        for lib in [first.path(), second.path()] {
            fs::create_dir_all(lib.join("steamapps").join("common").join("VRChat")).unwrap();
        }

        let libraries = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        let found = find_game_in_libraries(&libraries, "VRChat").unwrap();
        assert!(found.starts_with(first.path()));
    }

    fn vdf_path(path: &Path) -> String {
        path.display().to_string().replace('\\', "\\\\")
    }

    fn write_library_folders(install: &Path, libraries: &[&Path]) {
        let mut vdf = String::from("\"libraryfolders\"\n{\n");
        for (index, library) in libraries.iter().enumerate() {
            fs::create_dir_all(library.join("steamapps")).unwrap();
            vdf.push_str(&format!(
                "\t\"{index}\"\n\t{{\n\t\t\"path\"\t\t\"{}\"\n\t\t\"label\"\t\t\"\"\n\t\t\"apps\"\n\t\t{{\n\t\t}}\n\t}}\n",
                vdf_path(library)
            ));
        }
        vdf.push_str("}\n");
        fs::create_dir_all(install.join("steamapps")).unwrap();
        fs::write(install.join("steamapps").join("libraryfolders.vdf"), vdf).unwrap();
    }

    #[test]
    fn library_dirs_follow_libraryfolders_vdf() {
        let install = TempDir::new().unwrap();
        let extra = TempDir::new().unwrap();
        write_library_folders(install.path(), &[install.path(), extra.path()]);

        let dirs = steam_library_dirs(install.path()).unwrap();
        assert_eq!(dirs, vec![install.path().to_path_buf(), extra.path().to_path_buf()]);
    }

    #[test]
    fn install_dir_is_prepended_when_not_listed() {
        let install = TempDir::new().unwrap();
        let extra = TempDir::new().unwrap();
        write_library_folders(install.path(), &[extra.path()]);

        let dirs = steam_library_dirs(install.path()).unwrap();
        assert_eq!(dirs, vec![install.path().to_path_buf(), extra.path().to_path_buf()]);
    }

    #[test]
    fn missing_libraryfolders_vdf_is_an_error() {
        let install = TempDir::new().unwrap();
        assert!(steam_library_dirs(install.path()).is_err());
    }

    #[test]
    fn missing_game_names_the_game() {
        let lib = TempDir::new().unwrap();
        let err = find_game_in_libraries(&[lib.path().to_path_buf()], "VRChat").unwrap_err();
        assert_eq!(err.to_string(), "game directory not found for VRChat");
    }
}
