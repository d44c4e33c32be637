#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(err) = native::run(std::env::args().skip(1)) {
        eprintln!("horn_cli error: {err}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::fmt::Write as _;
    use std::fs::{self, File};
    use std::io::{BufWriter, Write};
    use std::path::{Path, PathBuf};

    use waveguide_engine::geom::{HornMesh, MeshQualityReport};
    use waveguide_engine::horn::{
        CircularArc, EnclosureParams, EnclosureSpacing, GuidingCurve, HornBuild, HornContext, HornParams,
        MorphParams, OsseParams, ParamValue, ProfileParams, RosseParams, SamplingParams, Symmetry,
        build_horn_with_context,
    };

    /// Snapshot coordinates are rounded to this step.
    const QUANTUM: f64 = 1e-6;

    const USAGE: &str = r#"horn_cli (waveguide-engine)

USAGE:
  horn_cli list
  horn_cli run <scenario|all> [options]

OPTIONS (run):
  --out-dir <dir>    Write <scenario>.obj and <scenario>.snap into <dir> (required for `all`)
  --obj <path>       Write OBJ with one group per mesh group
  --snap <path>      Write the snapshot to <path> instead of stdout
  --strict           Fail on parameter errors or quality violations
  --overwrite        Replace existing output files
"#;

    pub fn run(mut args: impl Iterator<Item = String>) -> Result<(), String> {
        match args.next().as_deref() {
            None | Some("-h" | "--help" | "help") => println!("{USAGE}"),
            Some("list") => {
                for scenario in Scenario::ALL {
                    println!("{:<22} {}", scenario.name(), scenario.description());
                }
            }
            Some("run") => {
                let name = args.next().ok_or("missing scenario name")?;
                let opts = RunOptions::parse(args)?;
                run_named(&name, &opts)?;
            }
            Some(other) => return Err(format!("unknown command `{other}`\n\n{USAGE}")),
        }
        Ok(())
    }

    #[derive(Debug, Default, PartialEq)]
    struct RunOptions {
        out_dir: Option<PathBuf>,
        obj: Option<PathBuf>,
        snap: Option<PathBuf>,
        strict: bool,
        overwrite: bool,
    }

    impl RunOptions {
        fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, String> {
            let mut opts = Self::default();
            while let Some(flag) = args.next() {
                let mut path = || {
                    args.next()
                        .map(PathBuf::from)
                        .ok_or_else(|| format!("missing value for {flag}"))
                };
                match flag.as_str() {
                    "--out-dir" => opts.out_dir = Some(path()?),
                    "--obj" => opts.obj = Some(path()?),
                    "--snap" => opts.snap = Some(path()?),
                    "--strict" => opts.strict = true,
                    "--overwrite" => opts.overwrite = true,
                    other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
                }
            }
            if opts.out_dir.is_some() && (opts.obj.is_some() || opts.snap.is_some()) {
                return Err("use either --out-dir or --obj/--snap".to_string());
            }
            Ok(opts)
        }
    }

    fn run_named(name: &str, opts: &RunOptions) -> Result<(), String> {
        let scenarios: Vec<Scenario> = if name == "all" {
            if opts.out_dir.is_none() {
                return Err("`run all` requires --out-dir".to_string());
            }
            Scenario::ALL.to_vec()
        } else {
            let scenario = Scenario::from_name(name).ok_or_else(|| {
                let names: Vec<&str> = Scenario::ALL.iter().map(|s| s.name()).collect();
                format!("unknown scenario `{name}` (available: {})", names.join(", "))
            })?;
            vec![scenario]
        };

        for scenario in scenarios {
            let output = run_scenario(scenario, opts.strict)?;
            let (snap, obj) = match opts.out_dir.as_deref() {
                Some(dir) => (
                    Some(dir.join(format!("{}.snap", output.name))),
                    Some(dir.join(format!("{}.obj", output.name))),
                ),
                None => (opts.snap.clone(), opts.obj.clone()),
            };
            match snap {
                Some(path) => {
                    create(&path, opts.overwrite)?
                        .write_all(output.snapshot.as_bytes())
                        .map_err(|e| format!("write {}: {e}", path.display()))?;
                    eprintln!("wrote {}", path.display());
                }
                None => print!("{}", output.snapshot),
            }
            if let Some(path) = obj {
                write_obj(create(&path, opts.overwrite)?, &output.build.mesh, output.name)
                    .map_err(|e| format!("write {}: {e}", path.display()))?;
                eprintln!("wrote {}", path.display());
            }

            eprintln!("{}: {}", output.name, output.build.quality.summary());
            for issue in &output.build.issues {
                eprintln!("  {issue}");
            }
            if let Some(timing) = &output.build.quality.timing {
                eprintln!("  built in {:.3} ms", timing.total_ms());
            }
        }
        Ok(())
    }

    fn create(path: &Path, overwrite: bool) -> Result<BufWriter<File>, String> {
        if path.exists() && !overwrite {
            return Err(format!("{} exists (pass --overwrite)", path.display()));
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| format!("create dir {}: {e}", parent.display()))?;
        }
        File::create(path)
            .map(BufWriter::new)
            .map_err(|e| format!("create {}: {e}", path.display()))
    }

    /// Writes the mesh as OBJ, one `g` block per group in triangle order.
    fn write_obj(mut w: impl Write, mesh: &HornMesh, name: &str) -> std::io::Result<()> {
        writeln!(w, "# waveguide-engine horn_cli\no {name}")?;
        for [x, y, z] in &mesh.positions {
            writeln!(w, "v {x} {y} {z}")?;
        }

        let mut groups: Vec<_> = mesh.groups.iter().collect();
        groups.sort_by_key(|(_, range)| range.start);
        let mut blocks: Vec<(&str, usize, usize)> = Vec::new();
        let mut cursor = 0;
        for (group, range) in groups {
            if range.start > cursor {
                blocks.push(("default", cursor, range.start));
            }
            blocks.push((group.as_str(), range.start, range.end));
            cursor = range.end;
        }
        if cursor < mesh.triangle_count() {
            blocks.push(("default", cursor, mesh.triangle_count()));
        }

        for (group, start, end) in blocks {
            writeln!(w, "g {group}")?;
            for tri in mesh.indices[start * 3..end * 3].chunks_exact(3) {
                writeln!(w, "f {} {} {}", tri[0] + 1, tri[1] + 1, tri[2] + 1)?;
            }
        }
        w.flush()
    }

    /// Rounds to [`QUANTUM`] and folds `-0` into `0` so snapshots diff cleanly.
    fn quantize(value: f64) -> f64 {
        if !value.is_finite() {
            return value;
        }
        (value / QUANTUM).round() * QUANTUM + 0.0
    }

    fn snapshot(op: &str, build: &HornBuild) -> String {
        let report: &MeshQualityReport = &build.quality;
        let mesh = &build.mesh;
        let mut out = format!("# waveguide-engine golden v1\nop {op}\nquantize {QUANTUM:.1e}\n");

        let counts = [
            ("vertex_count", report.vertex_count),
            ("triangle_count", report.triangle_count),
            ("degenerate_triangle_count", report.degenerate_triangle_count),
            ("boundary_edge_count", report.boundary_edge_count),
            ("non_manifold_edge_count", report.non_manifold_edge_count),
            ("component_count", report.component_count),
            ("non_finite_vertex_count", report.non_finite_vertex_count),
            ("longest_zipper_fan", report.longest_zipper_fan),
        ];
        for (label, value) in counts {
            let _ = writeln!(out, "quality.{label} {value}");
        }
        match &report.seam {
            Some(seam) => {
                let _ = writeln!(
                    out,
                    "quality.seam {} {} shared={} consistent={} inverted={}",
                    seam.first_group, seam.second_group, seam.shared_edges, seam.consistent_edges, seam.inverted_edges
                );
            }
            None => out.push_str("quality.seam none\n"),
        }
        let _ = writeln!(out, "quality.warning_count {}", report.warnings.len());
        for (idx, warning) in report.warnings.iter().enumerate() {
            let _ = writeln!(out, "quality.warning.{idx} {warning}");
        }

        let _ = writeln!(out, "mesh.ring_count {}", mesh.ring_count);
        let _ = writeln!(out, "mesh.full_circle {}", mesh.full_circle);
        let _ = writeln!(out, "mesh.groups {}", mesh.groups.len());
        for (name, range) in &mesh.groups {
            let _ = writeln!(out, "g {name} {} {}", range.start, range.end);
        }
        let _ = writeln!(out, "mesh.positions {}", mesh.positions.len());
        for p in &mesh.positions {
            let [x, y, z] = p.map(quantize);
            let _ = writeln!(out, "p {x:.6} {y:.6} {z:.6}");
        }
        let _ = writeln!(out, "mesh.indices {}", mesh.indices.len());
        for tri in mesh.indices.chunks_exact(3) {
            let _ = writeln!(out, "i {} {} {}", tri[0], tri[1], tri[2]);
        }
        out
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Scenario {
        RosseDefault,
        OsseDefault,
        OsseEnclosure,
        OsseHalfEnclosure,
        RosseRectMorph,
        OsseGuidedAdaptive,
    }

    impl Scenario {
        const ALL: &'static [Scenario] = &[
            Scenario::RosseDefault,
            Scenario::OsseDefault,
            Scenario::OsseEnclosure,
            Scenario::OsseHalfEnclosure,
            Scenario::RosseRectMorph,
            Scenario::OsseGuidedAdaptive,
        ];

        fn name(self) -> &'static str {
            match self {
                Scenario::RosseDefault => "rosse_default",
                Scenario::OsseDefault => "osse_default",
                Scenario::OsseEnclosure => "osse_enclosure",
                Scenario::OsseHalfEnclosure => "osse_half_enclosure",
                Scenario::RosseRectMorph => "rosse_rect_morph",
                Scenario::OsseGuidedAdaptive => "osse_guided_adaptive",
            }
        }

        fn description(self) -> &'static str {
            match self {
                Scenario::RosseDefault => "R-OSSE with default parameters",
                Scenario::OsseDefault => "OSSE with default parameters",
                Scenario::OsseEnclosure => "closed OSSE horn in a 24-segment enclosure",
                Scenario::OsseHalfEnclosure => "half-symmetry OSSE with throat extension, slot and enclosure",
                Scenario::RosseRectMorph => "R-OSSE morphed to a rounded rectangle",
                Scenario::OsseGuidedAdaptive => "OSSE on a superellipse guiding curve with adaptive rings",
            }
        }

        fn from_name(name: &str) -> Option<Self> {
            Self::ALL.iter().copied().find(|scenario| scenario.name() == name)
        }

        fn params(self) -> HornParams {
            match self {
                Scenario::RosseDefault => HornParams::default(),
                Scenario::OsseDefault => HornParams {
                    profile: ProfileParams::Osse(OsseParams::default()),
                    ..HornParams::default()
                },
                Scenario::OsseEnclosure => HornParams {
                    profile: ProfileParams::Osse(small_osse()),
                    sampling: SamplingParams {
                        angular_segments: 24,
                        length_segments: 12,
                        ..SamplingParams::default()
                    },
                    enclosure: Some(EnclosureParams {
                        depth: 150.0,
                        edge_radius: 5.0,
                        spacing: EnclosureSpacing::uniform(30.0),
                        ..EnclosureParams::default()
                    }),
                    ..HornParams::default()
                },
                Scenario::OsseHalfEnclosure => HornParams {
                    profile: ProfileParams::Osse(OsseParams {
                        throat_ext_length: 10.0,
                        throat_ext_angle: 5.0,
                        slot_length: 5.0,
                        circular_arc: None,
                        ..OsseParams::default()
                    }),
                    sampling: SamplingParams {
                        angular_segments: 48,
                        length_segments: 20,
                        symmetry: Symmetry::HalfX,
                        ..SamplingParams::default()
                    },
                    enclosure: Some(EnclosureParams {
                        interface_offset: 40.0,
                        ..EnclosureParams::default()
                    }),
                    ..HornParams::default()
                },
                Scenario::RosseRectMorph => HornParams {
                    profile: ProfileParams::ROsse(RosseParams {
                        coverage_angle: ParamValue::expression(|p| 50.0 - 15.0 * p.sin().powi(2)),
                        ..RosseParams::default()
                    }),
                    morph: Some(MorphParams {
                        target_width: 360.0,
                        target_height: 220.0,
                        ..MorphParams::default()
                    }),
                    ..HornParams::default()
                },
                Scenario::OsseGuidedAdaptive => HornParams {
                    profile: ProfileParams::Osse(OsseParams {
                        guiding_curve: Some(GuidingCurve::default()),
                        circular_arc: Some(CircularArc::TerminalAngle(80.0)),
                        ..OsseParams::default()
                    }),
                    sampling: SamplingParams {
                        angular_segments: 64,
                        adaptive_throat_segments: Some(16),
                        ..SamplingParams::default()
                    },
                    cap_throat: true,
                    ..HornParams::default()
                },
            }
        }
    }

    fn small_osse() -> OsseParams {
        OsseParams {
            length: 120.0.into(),
            throat_radius: 10.0.into(),
            throat_angle: 10.0.into(),
            coverage_angle: 30.0.into(),
            k: 1.0.into(),
            s: 0.0.into(),
            ..OsseParams::default()
        }
    }

    struct ScenarioOutput {
        name: &'static str,
        build: HornBuild,
        snapshot: String,
    }

    fn run_scenario(scenario: Scenario, strict: bool) -> Result<ScenarioOutput, String> {
        let mut ctx = HornContext {
            strict,
            ..HornContext::new()
        };
        let build = build_horn_with_context(&scenario.params(), &mut ctx).map_err(|e| e.to_string())?;
        build
            .mesh
            .validate()
            .map_err(|e| format!("mesh validation failed: {e}"))?;
        let snapshot = snapshot(scenario.name(), &build);
        Ok(ScenarioOutput {
            name: scenario.name(),
            build,
            snapshot,
        })
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn parse(args: &[&str]) -> Result<RunOptions, String> {
            RunOptions::parse(args.iter().map(|s| (*s).to_string()))
        }

        #[test]
        fn run_options_accept_the_documented_flags() {
            let opts = parse(&["--obj", "a.obj", "--snap", "a.snap", "--strict"]).expect("options");
            assert_eq!(opts.obj, Some(PathBuf::from("a.obj")));
            assert_eq!(opts.snap, Some(PathBuf::from("a.snap")));
            assert!(opts.strict);
            assert!(!opts.overwrite);
        }

        #[test]
        fn run_options_reject_unknown_and_conflicting_flags() {
            assert!(parse(&["--no-obj"]).is_err());
            assert!(parse(&["--out-dir"]).is_err());
            assert!(parse(&["--out-dir", "out", "--obj", "a.obj"]).is_err());
        }

        #[test]
        fn quantize_folds_negative_zero() {
            assert_eq!(quantize(-1e-9).to_bits(), 0.0_f64.to_bits());
            assert!((quantize(1.234_567_4) - 1.234_567).abs() < 1e-12);
        }

        #[test]
        fn enclosure_scenario_snapshot_is_closed() {
            let output = run_scenario(Scenario::OsseEnclosure, true).expect("scenario");
            assert!(output.snapshot.contains("quality.boundary_edge_count 0\n"));
            assert!(output.build.issues.iter().all(|issue| issue.param != "enclosure.depth"));
        }
    }
}
