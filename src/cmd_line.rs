//! Command line options for the filler.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, TimeZone};
use clap::{crate_version, App, Arg};

static DATE_FORMAT: &str = "%Y-%m-%d";

/// Struct to package up command line arguments.
#[derive(Clone, Debug)]
pub struct CmdLineArgs {
    // Start of the fill window, inclusive.
    begin: DateTime<Local>,
    // End of the fill window, exclusive.
    end: DateTime<Local>,
    // Network address of the station logger, e.g. wx:8080
    station_addr: String,
    // Weather Underground station id, e.g. KXXTEST1
    pws_id: String,
    // Weather Underground station password, may be empty.
    password: String,
    // Analyze and report only, never upload.
    test: bool,
}

impl<'a, 'b> CmdLineArgs {
    /// Create the clap app for the filler.
    pub fn new_app(app_name: &'static str, about: &'static str) -> App<'a, 'b> {
        App::new(app_name)
            .about(about)
            .version(crate_version!())
            .arg(
                Arg::with_name("begin")
                    .long("begin")
                    .takes_value(true)
                    .help("Fill begin date, YYYY-MM-DD. Defaults to today."),
            )
            .arg(
                Arg::with_name("end")
                    .long("end")
                    .takes_value(true)
                    .help("Fill end date (inclusive), YYYY-MM-DD. Defaults to today."),
            )
            .arg(
                Arg::with_name("station")
                    .long("station")
                    .takes_value(true)
                    .required(true)
                    .help("Weather station logger address, e.g. wx:8080."),
            )
            .arg(
                Arg::with_name("id")
                    .long("id")
                    .takes_value(true)
                    .required(true)
                    .help("Personal weather station id."),
            )
            .arg(
                Arg::with_name("pass")
                    .long("pass")
                    .takes_value(true)
                    .help("Personal weather station password."),
            )
            .arg(
                Arg::with_name("test")
                    .long("test")
                    .help("Test only, report what would be uploaded but do not upload."),
            )
            .after_help(concat!(
                "Both dates are interpreted in the station's local time zone and the end",
                " date is inclusive, so the default fills any gaps from today."
            ))
    }

    /// Process an `App` into parsed values.
    pub fn matches(app: App<'a, 'b>) -> CmdLineArgs {
        let matches = app.get_matches();

        let usage = matches.usage().to_owned();
        let print_usage_message = |msg: &str| -> ! {
            println!("\n{}\n\n{}\n", msg, usage);
            println!("Try the -h or --help option for more instructions.");
            ::std::process::exit(1);
        };

        let parse_date = |name: &str| -> NaiveDate {
            match matches.value_of(name) {
                Some(val) => match NaiveDate::parse_from_str(val, DATE_FORMAT) {
                    Ok(date) => date,
                    Err(_) => print_usage_message(&format!(
                        "Invalid {} date '{}', expected YYYY-MM-DD.",
                        name, val
                    )),
                },
                None => Local::now().date_naive(),
            }
        };

        let begin_date = parse_date("begin");
        let end_date = parse_date("end");

        if begin_date > end_date {
            print_usage_message("Begin date is after end date.");
        }

        let (begin, end) = window(begin_date, end_date);

        CmdLineArgs {
            begin,
            end,
            station_addr: matches.value_of("station").unwrap_or("").to_owned(),
            pws_id: matches.value_of("id").unwrap_or("").to_owned(),
            password: matches.value_of("pass").unwrap_or("").to_owned(),
            test: matches.is_present("test"),
        }
    }

    /// Start of the fill window, inclusive.
    pub fn begin(&self) -> DateTime<Local> {
        self.begin
    }

    /// End of the fill window, exclusive.
    pub fn end(&self) -> DateTime<Local> {
        self.end
    }

    /// Network address of the station logger.
    pub fn station_addr(&self) -> &str {
        &self.station_addr
    }

    /// Weather Underground station id.
    pub fn pws_id(&self) -> &str {
        &self.pws_id
    }

    /// Weather Underground station password, possibly empty.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Whether this is a test-only run.
    pub fn test(&self) -> bool {
        self.test
    }
}

// Convert an inclusive pair of dates into a half-open window of instants, local midnight
// of the begin date up to local midnight of the day after the end date.
fn window(begin_date: NaiveDate, end_date: NaiveDate) -> (DateTime<Local>, DateTime<Local>) {
    (
        local_midnight(begin_date),
        local_midnight(end_date + Duration::days(1)),
    )
}

fn local_midnight(date: NaiveDate) -> DateTime<Local> {
    Local
        .from_local_datetime(&date.and_time(NaiveTime::MIN))
        .earliest()
        .expect("no local midnight for date")
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
