//! Path translation between the MSYS2 POSIX view and native Windows paths.

use std::path::{Path, PathBuf};

/// Translate an MSYS2 path into a native Windows path.
///
/// - `/c/Windows/System32/x.dll` -> `C:\Windows\System32\x.dll`
/// - `/mingw64/bin/x.dll` -> `<dir_msys_root>\mingw64\bin\x.dll` when the
///   installation root is known, `\mingw64\bin\x.dll` otherwise
/// - relative paths only get their separators translated
pub fn convert_msys_path_to_windows(path: &str, dir_msys_root: Option<&str>) -> String {
    let Some(rest) = path.strip_prefix('/') else {
        return path.replace('/', "\\");
    };

    let (head, tail) = rest.split_once('/').unwrap_or((rest, ""));
    if head.len() == 1 && head.as_bytes()[0].is_ascii_alphabetic() {
        return format!("{}:\\{}", head.to_ascii_uppercase(), tail.replace('/', "\\"));
    }

    match dir_msys_root {
        Some(root) => format!(
            "{}\\{}",
            root.trim_end_matches(['\\', '/']),
            rest.replace('/', "\\")
        ),
        None => path.replace('/', "\\"),
    }
}

/// Place a rooted MSYS2 path under the native installation root using the
/// host's separators, e.g. `/mingw64/bin/x.dll` under `C:\msys64`.
///
/// Drive paths (`/c/...`) already name a native location and are translated
/// with [`convert_msys_path_to_windows`] instead.
pub fn join_msys_path_under_root(path: &str, dir_msys_root: &Path) -> PathBuf {
    if _is_msys_drive_path(path) {
        return PathBuf::from(convert_msys_path_to_windows(path, None));
    }
    path.split('/')
        .filter(|c| !c.is_empty())
        .fold(dir_msys_root.to_path_buf(), |acc, c| acc.join(c))
}

fn _is_msys_drive_path(path: &str) -> bool {
    let Some(rest) = path.strip_prefix('/') else {
        return false;
    };
    let head = rest.split_once('/').map_or(rest, |(h, _)| h);
    head.len() == 1 && head.as_bytes()[0].is_ascii_alphabetic()
}
