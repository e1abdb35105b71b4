use std::path::PathBuf;

#[test]
fn cli_path_writes_points_json() {
    let dir = PathBuf::from("target").join("cli_smoke");
    std::fs::create_dir_all(&dir).unwrap();

    let out_path = dir.join("path.json");
    let _ = std::fs::remove_file(&out_path);

    let out_arg = out_path.to_string_lossy().to_string();
    let profile_dir = if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    };
    let direct_bin = std::env::var_os("CARGO_BIN_EXE_synther")
        .map(PathBuf::from)
        .or_else(|| {
            let mut p = PathBuf::from("target").join(profile_dir);
            p.push(if cfg!(windows) {
                "synther.exe"
            } else {
                "synther"
            });
            if p.is_file() { Some(p) } else { None }
        });

    let status = if let Some(exe) = direct_bin {
        std::process::Command::new(exe)
            .args(["path", "--half", "--out", out_arg.as_str()])
            .status()
            .unwrap()
    } else {
        let cargo = std::env::var_os("CARGO")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("cargo"));
        std::process::Command::new(cargo)
            .args([
                "run",
                "--bin",
                "synther",
                "--",
                "path",
                "--half",
                "--out",
                out_arg.as_str(),
            ])
            .status()
            .unwrap()
    };

    assert!(status.success());
    let points: Vec<[f64; 3]> =
        serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
    // 23 revolutions at 10° steps down to the equator.
    assert_eq!(points.len(), 414);
}
