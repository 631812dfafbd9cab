//! Shell scripts that impersonate the external tools.
//!
//! Each fake accepts the same argument contract as the real tool and appends
//! its arguments to `<name>.calls` next to the script, so tests can assert
//! how often and with what it was invoked.

use std::fs;
use std::path::{Path, PathBuf};

#[cfg(unix)]
fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    let script = format!(
        "#!/bin/sh\necho \"$@\" >> \"$(dirname \"$0\")/{name}.calls\"\n{body}\n"
    );
    fs::write(&path, script)
        .unwrap_or_else(|e| panic!("write_script: failed to write {}: {e}", path.display()));
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// `7z x <archive> -o<dest> -y` implemented with `tar -xf`.
#[cfg(unix)]
pub fn fake_archiver(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "7z",
        r#"[ "$1" = "x" ] || { echo "unsupported command: $1"; exit 7; }
dest="${3#-o}"
mkdir -p "$dest" || exit 2
tar -xf "$2" -C "$dest" || { echo "ERROR: cannot open $2"; exit 2; }
echo "Everything is Ok""#,
    )
}

/// An archiver that prints `output` and exits with `code` after extracting.
#[cfg(unix)]
pub fn scripted_archiver(dir: &Path, code: i32, output: &str) -> PathBuf {
    write_script(
        dir,
        "7z",
        &format!(
            r#"dest="${{3#-o}}"
mkdir -p "$dest"
tar -xf "$2" -C "$dest" 2>/dev/null
cat <<'IMGSYNC_EOF'
{output}
IMGSYNC_EOF
exit {code}"#
        ),
    )
}

/// An archiver that never finishes on its own.
#[cfg(unix)]
pub fn hanging_archiver(dir: &Path) -> PathBuf {
    write_script(dir, "7z", "echo \"Extracting\"\nexec sleep 60")
}

/// `apktool d -f -o <dest> <apk>`: writes a manifest whose `package` is the
/// first line of the apk file, plus a copy of the apk.
#[cfg(unix)]
pub fn fake_decoder(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "apktool",
        r#"[ "$1" = "d" ] || { echo "unsupported command: $1"; exit 7; }
dest="$4"
apk="$5"
mkdir -p "$dest/smali" || exit 1
pkg=$(head -n 1 "$apk")
printf '<?xml version="1.0" encoding="utf-8" standalone="no"?>\n<manifest xmlns:android="http://schemas.android.com/apk/res/android" package="%s"/>\n' "$pkg" > "$dest/AndroidManifest.xml"
cp "$apk" "$dest/original.apk"
echo "I: Using Apktool (fake) on $(basename "$apk")""#,
    )
}

/// A decoder that exits 0 but writes no manifest.
#[cfg(unix)]
pub fn decoder_without_manifest(dir: &Path) -> PathBuf {
    write_script(dir, "apktool", r#"mkdir -p "$4/res""#)
}

/// A decoder that writes partial output and then fails.
#[cfg(unix)]
pub fn failing_decoder(dir: &Path, code: i32) -> PathBuf {
    write_script(
        dir,
        "apktool",
        &format!(
            r#"mkdir -p "$4/res"
echo "Exception in thread main brut.androlib.AndrolibException"
exit {code}"#
        ),
    )
}

/// Arguments of every recorded invocation of the fake `name` in `dir`.
pub fn recorded_calls(dir: &Path, name: &str) -> Vec<String> {
    fs::read_to_string(dir.join(format!("{name}.calls")))
        .map(|s| s.lines().map(str::to_string).collect())
        .unwrap_or_default()
}
