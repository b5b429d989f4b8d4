// Peregrine Assembler and SHIMMER Genome Assembly Toolkit
// 2019, 2020, 2021- (c) by Jason, Chen-Shan, Chin
//
// This Source Code Form is subject to the terms of the
// Creative Commons Attribution-NonCommercial-ShareAlike 4.0 International License.
//
// You should have received a copy of the license along with this
// work. If not, see <http://creativecommons.org/licenses/by-nc-sa/4.0/>.

const VERSION_STRING: &'static str = env!("VERSION_STRING");

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{clap_app, ArgMatches};
use pathfinder::io::{load_overlap_chunks, read_read_table, write_layout};
use pathfinder::tiling::TilingContig;
use pathfinder::{AssemblyMode, Pathfinder, PathfinderConfig};
use simple_logger::SimpleLogger;
use std::error::Error;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;
use std::time::{Duration, SystemTime};

mod utils;
use utils::{log_resource, log_summary, log_system_memory, new_rusage, Parameters};

fn arg_or<T: FromStr>(matches: &ArgMatches, name: &str, default: &str) -> Result<T, String> {
    let v = matches.value_of(name).unwrap_or(default);
    v.parse::<T>()
        .map_err(|_| format!("invalid value '{}' for {}", v, name))
}

fn opt_arg<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<Option<T>, String> {
    match matches.value_of(name) {
        Some(v) => v
            .parse::<T>()
            .map(Some)
            .map_err(|_| format!("invalid value '{}' for {}", v, name)),
        None => Ok(None),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut rdata = new_rusage();

    let matches = clap_app!(pf_asm =>
        (version: VERSION_STRING)
        (author: "Jason Chin <jason@omnibio.ai>")
        (about: "
pf_asm: greedy contig construction over a precomputed read overlap graph
LICENSE: http://creativecommons.org/licenses/by-nc-sa/4.0/")
        (@arg read_table: +required "Path to the read table (R records, optionally gzipped)")
        (@arg ovlp_prefix: +required "Prefix of the overlap chunk files, all files matching <prefix>* are loaded")
        (@arg out_layout: +required "Path of the output layout file")
        (@arg NTHREADS: +takes_value "Number of threads for loading overlaps")
        (@arg mode: -m --mode +takes_value "assembly mode: genome, est or mapping [default: genome]")
        (@arg bl_release: --bl_release +takes_value "successful merges before a blacklist batch is released [default: 8]")
        (@arg bl_max: --bl_max +takes_value "maximum number of blacklisted reads [default: 256]")
        (@arg seed_cap: --seed_cap +takes_value "maximum cluster size in the seed search [default: 4096]")
        (@arg seed_cache: --seed_cache +takes_value "maximum number of cached seeds [default: 100000]")
        (@arg max_attempts: --max_attempts +takes_value "merge attempt budget per contig [default: none]")
        (@arg max_time: --max_time +takes_value "time budget per contig in seconds [default: none]")
        (@arg resync_dist: --resync_dist +takes_value "bases from a contig end refilled on resync [default: 2000]")
        (@arg est_level: --est_level +takes_value "highest repeat level treated as unique in est mode [default: 1]")
        (@arg tol: -t --tol +takes_value "placement tolerance of the tiling contig in bases [default: 20]")
        (@arg max_reads: --max_reads +takes_value "maximum number of reads per contig [default: none]")
        (@arg refuse_bare_repeats: --refuse_bare_repeats "refuse repeat extensions without template support")
        (@arg log: --log +takes_value "log level: DBBUG or INFO (default)")
    )
    .get_matches();

    let log_level = match matches.value_of("log").unwrap_or("INFO") {
        "DEBUG" => log::LevelFilter::Debug,
        _ => log::LevelFilter::Info,
    };

    SimpleLogger::new()
        .with_level(log_level)
        .with_utc_timestamps()
        .init()?;

    let read_table = matches.value_of("read_table").unwrap_or_default().to_string();
    let ovlp_prefix = matches.value_of("ovlp_prefix").unwrap_or_default().to_string();
    let out_layout = matches.value_of("out_layout").unwrap_or_default().to_string();

    let physical_cpus = num_cpus::get_physical();
    let nthreads = arg_or::<usize>(&matches, "NTHREADS", &physical_cpus.to_string())?;

    let mode = match matches.value_of("mode").unwrap_or("genome") {
        "genome" => AssemblyMode::Genome,
        "est" => AssemblyMode::Est,
        "mapping" => AssemblyMode::Mapping,
        m => return Err(format!("unknown mode '{}'", m).into()),
    };

    let config = PathfinderConfig {
        mode,
        blacklist_release_after: arg_or(&matches, "bl_release", "8")?,
        blacklist_max_entries: arg_or(&matches, "bl_max", "256")?,
        seed_cluster_cap: arg_or(&matches, "seed_cap", "4096")?,
        seed_cache_max: arg_or(&matches, "seed_cache", "100000")?,
        max_attempts_per_contig: opt_arg(&matches, "max_attempts")?,
        max_time_per_contig: opt_arg::<u64>(&matches, "max_time")?.map(Duration::from_secs),
        resync_end_distance: arg_or(&matches, "resync_dist", "2000")?,
        est_repeat_level_ceiling: arg_or(&matches, "est_level", "1")?,
        ..Default::default()
    };
    config.validate()?;

    let parameters = Parameters {
        nthreads,
        tol: arg_or(&matches, "tol", "20")?,
        max_reads: opt_arg(&matches, "max_reads")?.unwrap_or(usize::MAX),
        refuse_bare_repeats: matches.is_present("refuse_bare_repeats"),
    };

    log::info!("pf_asm {}", VERSION_STRING);
    log::info!(
        "command: {}",
        std::env::args().collect::<Vec<String>>().join(" ")
    );
    let cdir = std::env::current_dir()?;
    log::info!("current dir: {}", cdir.as_os_str().to_string_lossy());

    let start_wall_clock_time = SystemTime::now();
    log::info!("pf_asm run start");
    log_resource("BGN: pf_asm", &mut rdata);
    log::info!("pf_asm run parameters: {:?}", config);
    log::info!("number of threads: {}", parameters.nthreads);
    log::info!(
        "sys: number of physical CPU cores detected: {}",
        physical_cpus
    );
    log_system_memory();

    rayon::ThreadPoolBuilder::new()
        .num_threads(parameters.nthreads)
        .build_global()?;

    log_resource("BGN: read table", &mut rdata);
    let reads = read_read_table(Path::new(&read_table))?;
    log::info!("number of reads: {}", reads.len());
    log_resource("END: read table", &mut rdata);

    log_resource("BGN: load overlaps", &mut rdata);
    let graph = load_overlap_chunks(&ovlp_prefix, &reads)?;
    log::info!("number of overlap edges: {}", graph.n_edges());
    log_resource("END: load overlaps", &mut rdata);

    log_resource("BGN: pathfinder", &mut rdata);
    let mut pf = Pathfinder::new(&reads, &graph, config)?;
    let mut ledger = pf.new_ledger();
    let contigs = pf.run_all(&mut ledger, |_| {
        TilingContig::new(&graph, &reads)
            .with_tolerance(parameters.tol)
            .with_max_reads(parameters.max_reads)
            .refusing_bare_repeats(parameters.refuse_bare_repeats)
    })?;
    log_resource("END: pathfinder", &mut rdata);
    log_summary(contigs.iter().map(|(r, _)| r));

    log_resource("BGN: write layout", &mut rdata);
    let mut out = BufWriter::new(File::create(&out_layout)?);
    write_layout(&mut out, &contigs, &ledger)?;
    out.flush()?;
    log_resource("END: write layout", &mut rdata);

    let (_, ut, st) = log_resource("END: pf_asm", &mut rdata);
    log::info!("pf_asm run end");
    log::info!(
        "total user cpu time: {} seconds = {} hours",
        ut,
        ut as f32 / 60.0 / 60.0
    );
    log::info!(
        "total system cpu time: {} seconds = {} hours",
        st,
        st as f32 / 60.0 / 60.0
    );
    let elapsed_time = start_wall_clock_time.elapsed()?.as_secs_f32();
    log::info!(
        "total elapse time: {} seconds = {} hours",
        elapsed_time,
        elapsed_time / 60.0 / 60.0
    );
    Ok(())
}
