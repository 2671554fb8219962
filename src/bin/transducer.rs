use clap::{App, Arg, SubCommand};
#[macro_use]
extern crate log;
fn subcommand_align() -> App<'static, 'static> {
    SubCommand::with_name("align")
        .version("0.1")
        .author("Bansho Masutani")
        .about("Calling reads by aligning template and complement transducers.")
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("Debug mode"),
        )
        .arg(
            Arg::with_name("input")
                .long("input")
                .short("i")
                .value_name("JSON")
                .takes_value(true)
                .help("Template/complement transducers. JSON format. Read stdin if not given."),
        )
        .arg(
            Arg::with_name("gap_in")
                .long("gap_in")
                .takes_value(true)
                .default_value("-3.0")
                .allow_hyphen_values(true)
                .help("Gap penalty for non-aligned events around the hairpin."),
        )
        .arg(
            Arg::with_name("gap")
                .long("gap")
                .takes_value(true)
                .default_value("-5.0")
                .allow_hyphen_values(true)
                .help("Gap penalty where template and complement are aligned."),
        )
        .arg(
            Arg::with_name("gap_out")
                .long("gap_out")
                .takes_value(true)
                .default_value("-3.0")
                .allow_hyphen_values(true)
                .help("Gap penalty for non-aligned events at the end of the strand."),
        )
        .arg(
            Arg::with_name("no_reverse")
                .long("no_reverse")
                .help("Do not reverse complement the template transducer."),
        )
        .arg(
            Arg::with_name("probabilities")
                .long("probabilities")
                .help("Inputs are probabilities instead of log-probabilities."),
        )
        .arg(
            Arg::with_name("min_prob")
                .long("min_prob")
                .takes_value(true)
                .default_value("0.00001")
                .help("Floor of the probabilities. Used with --probabilities."),
        )
        .arg(
            Arg::with_name("threads")
                .long("threads")
                .short("t")
                .takes_value(true)
                .default_value("1")
                .help("Number of threads"),
        )
}

fn subcommand_decode() -> App<'static, 'static> {
    SubCommand::with_name("decode")
        .version("0.1")
        .author("Bansho Masutani")
        .about("Calling reads by decoding full transducers.")
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("Debug mode"),
        )
        .arg(
            Arg::with_name("input")
                .long("input")
                .short("i")
                .value_name("JSON")
                .takes_value(true)
                .help("Full transducers. JSON format. Read stdin if not given."),
        )
        .arg(
            Arg::with_name("threads")
                .long("threads")
                .short("t")
                .takes_value(true)
                .default_value("1")
                .help("Number of threads"),
        )
}

fn parse_arg<T>(matches: &clap::ArgMatches, name: &str) -> std::io::Result<T>
where
    T: std::str::FromStr,
{
    matches
        .value_of(name)
        .and_then(|e| e.parse().ok())
        .ok_or_else(|| {
            let why = format!("Invalid value for --{}", name);
            std::io::Error::new(std::io::ErrorKind::InvalidInput, why)
        })
}

// Keep successful calls, report failures and go on.
fn collect_records<T, F>(
    names: &[&str],
    results: Vec<std::io::Result<T>>,
    f: F,
) -> Vec<(String, Vec<u8>)>
where
    F: Fn(&str, T) -> (String, Vec<u8>),
{
    let mut records = vec![];
    for (name, result) in names.iter().zip(results) {
        match result {
            Ok(call) => records.push(f(*name, call)),
            Err(why) => warn!("{} is skipped. {}", name, why),
        }
    }
    info!("Called {} out of {} reads", records.len(), names.len());
    records
}

fn align(matches: &clap::ArgMatches) -> std::io::Result<Vec<(String, Vec<u8>)>> {
    let input = matches.value_of("input");
    let records: Vec<transducer::io::AlignRecord> = transducer::io::read_records(&input)?;
    let gap_in: f64 = parse_arg(matches, "gap_in")?;
    let gap: f64 = parse_arg(matches, "gap")?;
    let gap_out: f64 = parse_arg(matches, "gap_out")?;
    let reverse_first = !matches.is_present("no_reverse");
    let config = transducer::AlignConfig::new(gap_in, gap, gap_out, reverse_first);
    let min_prob: f64 = parse_arg(matches, "min_prob")?;
    if !(0f64 < min_prob && min_prob < 1f64) {
        let why = format!("--min_prob should be in (0,1), but {}", min_prob);
        return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, why));
    }
    let min_prob = matches.is_present("probabilities").then(|| min_prob);
    debug!("{:?}\t{:?}", config, min_prob);
    let results = transducer::basecall_records(&records, &config, min_prob);
    let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
    Ok(collect_records(&names, results, |name, call| {
        let id = format!("{} score={:.3}", name, call.score);
        (id, call.sequence)
    }))
}

fn decode(matches: &clap::ArgMatches) -> std::io::Result<Vec<(String, Vec<u8>)>> {
    let input = matches.value_of("input");
    let records: Vec<transducer::io::DecodeRecord> = transducer::io::read_records(&input)?;
    let results = transducer::decode_records(&records);
    let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
    Ok(collect_records(&names, results, |name, path| {
        let id = format!("{} score={:.3}", name, path.score);
        (id, path.sequence())
    }))
}

fn main() -> std::io::Result<()> {
    let matches = App::new("transducer")
        .version("0.1")
        .author("Bansho Masutani")
        .about("Align:[JSON]->FASTA or Decode:[JSON]->FASTA")
        .setting(clap::AppSettings::ArgRequiredElseHelp)
        .subcommand(subcommand_align())
        .subcommand(subcommand_decode())
        .get_matches();
    if let Some(sub_m) = matches.subcommand().1 {
        let level = match sub_m.occurrences_of("verbose") {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
        let threads: usize = parse_arg(sub_m, "threads")?;
        if let Err(why) = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
        {
            debug!("{:?} The global thread pool is already built.", why);
        }
    }
    debug!("Start");
    let records = match matches.subcommand() {
        ("align", Some(sub_m)) => align(sub_m)?,
        ("decode", Some(sub_m)) => decode(sub_m)?,
        _ => unreachable!(),
    };
    let stdout = std::io::stdout();
    let mut wtr = std::io::BufWriter::new(stdout.lock());
    transducer::io::write_fasta(&mut wtr, &records)
}
