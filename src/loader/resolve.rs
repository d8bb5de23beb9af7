//! Import path resolution (spec §4.8). Search roots are the importing
//! file's own directory, then the process's working directory — an
//! absolute path bypasses the root search entirely. `name` is tried both
//! as `<name>.vlang` and, for package-style imports, `<name>/__init__.vlang`.

use std::path::{Path, PathBuf};

pub fn resolve_import_path(current_dir: &Path, name: &str) -> Option<PathBuf> {
    let direct = Path::new(name);
    if direct.is_absolute() {
        return existing_module_file(direct);
    }

    let mut roots = vec![current_dir.to_path_buf()];
    if let Ok(cwd) = std::env::current_dir() {
        if !roots.contains(&cwd) {
            roots.push(cwd);
        }
    }

    roots.iter().find_map(|root| existing_module_file(&root.join(name)))
}

fn existing_module_file(base: &Path) -> Option<PathBuf> {
    if base.is_file() {
        return Some(base.to_path_buf());
    }
    let with_ext = base.with_extension("vlang");
    if with_ext.is_file() {
        return Some(with_ext);
    }
    let init = base.join("__init__.vlang");
    if init.is_file() {
        return Some(init);
    }
    None
}
