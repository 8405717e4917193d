use crate::GameService;
use crate::HistoryService;
use crate::Host;
use crate::PlayerService;
use crate::ScheduleParams;
use crate::ScheduleService;
use crate::Session;
use nova_game::GameState;
use nova_game::GameType;
use nova_game::HostError;
use nova_game::Result;
use nova_schedule::Expiration;
use nova_schedule::ScheduleKind;

/// One wire reply, RESP-style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Ok,
    Int(i64),
    Str(String),
    List(Vec<String>),
    Error(String),
}

impl Reply {
    /// Serialize for the wire: `+` simple strings, `:` integers, `*`
    /// arrays, `-` errors.
    pub fn to_wire(&self) -> String {
        match self {
            Reply::Ok => "+OK\r\n".to_string(),
            Reply::Int(value) => format!(":{}\r\n", value),
            Reply::Str(value) => format!("+{}\r\n", value),
            Reply::List(items) => {
                let mut out = format!("*{}\r\n", items.len());
                for item in items {
                    out.push('+');
                    out.push_str(item);
                    out.push_str("\r\n");
                }
                out
            }
            Reply::Error(message) => format!("-{}\r\n", message),
        }
    }
}

impl From<Result<Reply>> for Reply {
    fn from(result: Result<Reply>) -> Self {
        result.unwrap_or_else(|error| Reply::Error(error.to_string()))
    }
}

fn invalid(what: &str) -> HostError {
    HostError::InvalidValue(what.to_string())
}

fn parse_int<T: std::str::FromStr>(token: Option<&&str>, what: &str) -> Result<T> {
    token
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| invalid(what))
}

/// Parse the keyword-style schedule arguments of the SCHEDULE verbs:
/// `STOPPED | WEEKLY n | DAILY mask | QUICK | MANUAL`, `DAYTIME n`,
/// `HOSTEARLY | NOHOSTEARLY`, `HOSTDELAY n`, `HOSTLIMIT n`,
/// `UNTILTURN n | UNTILTIME t | FOREVER`.
pub fn parse_schedule_params(tokens: &[&str]) -> Result<ScheduleParams> {
    let mut params = ScheduleParams::default();
    let mut iter = tokens.iter();
    while let Some(token) = iter.next() {
        match token.to_ascii_uppercase().as_str() {
            "STOPPED" => params.kind = Some(ScheduleKind::Stopped),
            "WEEKLY" => {
                params.kind = Some(ScheduleKind::Weekly);
                params.interval = Some(parse_int(iter.next(), "interval")?);
            }
            "DAILY" => {
                params.kind = Some(ScheduleKind::Daily);
                params.weekdays = Some(parse_int(iter.next(), "weekdays")?);
            }
            "QUICK" => params.kind = Some(ScheduleKind::Quick),
            "MANUAL" => params.kind = Some(ScheduleKind::Manual),
            "DAYTIME" => params.daytime = Some(parse_int(iter.next(), "daytime")?),
            "HOSTEARLY" => params.host_early = Some(true),
            "NOHOSTEARLY" => params.host_early = Some(false),
            "HOSTDELAY" => params.host_delay = Some(parse_int(iter.next(), "hostDelay")?),
            "HOSTLIMIT" => params.host_limit = Some(parse_int(iter.next(), "hostLimit")?),
            "UNTILTURN" => {
                params.expiration = Some(Expiration::AtTurn(parse_int(iter.next(), "turn")?))
            }
            "UNTILTIME" => {
                params.expiration = Some(Expiration::AtTime(parse_int(iter.next(), "time")?))
            }
            "FOREVER" => params.expiration = Some(Expiration::Never),
            other => return Err(invalid(other)),
        }
    }
    Ok(params)
}

fn format_schedule(schedule: &nova_schedule::Schedule) -> String {
    serde_json::to_string(schedule).unwrap_or_default()
}

/// Parse and execute one command line against a session.
pub fn handle_command(host: &Host, session: &mut Session, line: &str) -> Reply {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some(verb) = tokens.first() else {
        return Reply::Error("400 Empty command".to_string());
    };
    let args = &tokens[1..];
    dispatch(host, session, &verb.to_ascii_uppercase(), args).into()
}

fn dispatch(host: &Host, session: &mut Session, verb: &str, args: &[&str]) -> Result<Reply> {
    let games = GameService::new(host);
    let schedules = ScheduleService::new(host);
    let players = PlayerService::new(host);
    let history = HistoryService::new(host);
    match verb {
        "PING" => Ok(Reply::Str("PONG".to_string())),
        // Session management: USER with no argument reverts to admin.
        "USER" => {
            *session = match args.first() {
                Some(user) => Session::user(*user),
                None => Session::admin(),
            };
            Ok(Reply::Ok)
        }
        "NEWGAME" => Ok(Reply::Int(games.new_game(session)? as i64)),
        "CLONEGAME" => {
            let src = parse_int(args.first(), "game id")?;
            let state = args
                .get(1)
                .map(|s| GameState::parse(s).ok_or_else(|| invalid(s)))
                .transpose()?;
            Ok(Reply::Int(games.clone_game(session, src, state)? as i64))
        }
        "GAMESETSTATE" => {
            let id = parse_int(args.first(), "game id")?;
            let state = args
                .get(1)
                .and_then(|s| GameState::parse(s))
                .ok_or_else(|| invalid("state"))?;
            games.set_state(session, id, state)?;
            Ok(Reply::Ok)
        }
        "GAMESETTYPE" => {
            let id = parse_int(args.first(), "game id")?;
            let game_type = args
                .get(1)
                .and_then(|t| GameType::parse(t))
                .ok_or_else(|| invalid("type"))?;
            games.set_type(session, id, game_type)?;
            Ok(Reply::Ok)
        }
        "GAMESETOWNER" => {
            let id = parse_int(args.first(), "game id")?;
            let owner = args.get(1).ok_or_else(|| invalid("owner"))?;
            games.set_owner(session, id, owner)?;
            Ok(Reply::Ok)
        }
        "GAMESETNAME" => {
            let id = parse_int(args.first(), "game id")?;
            if args.len() < 2 {
                return Err(invalid("name"));
            }
            games.set_name(session, id, &args[1..].join(" "))?;
            Ok(Reply::Ok)
        }
        "GAMESET" => {
            let id = parse_int(args.first(), "game id")?;
            if args.len() < 3 || args.len() % 2 == 0 {
                return Err(invalid("key/value pairs"));
            }
            let entries: Vec<(String, String)> = args[1..]
                .chunks_exact(2)
                .map(|pair| (pair[0].to_string(), pair[1].to_string()))
                .collect();
            games.set_config(session, id, &entries)?;
            Ok(Reply::Ok)
        }
        "GAMEGET" => {
            let id = parse_int(args.first(), "game id")?;
            let key = args.get(1).ok_or_else(|| invalid("key"))?;
            Ok(Reply::Str(games.get_config(session, id, key)?))
        }
        "GAMESTAT" => {
            let id = parse_int(args.first(), "game id")?;
            let info = games.describe(session, id)?;
            Ok(Reply::Str(serde_json::to_string(&info).unwrap_or_default()))
        }
        "SCHEDULEADD" | "SCHEDULESET" | "SCHEDULEMOD" => {
            let id = parse_int(args.first(), "game id")?;
            let params = parse_schedule_params(&args[1..])?;
            match verb {
                "SCHEDULEADD" => schedules.add(session, id, &params)?,
                "SCHEDULESET" => schedules.replace(session, id, &params)?,
                _ => schedules.modify(session, id, &params)?,
            }
            Ok(Reply::Ok)
        }
        "SCHEDULEDROP" => {
            let id = parse_int(args.first(), "game id")?;
            schedules.drop_front(session, id)?;
            Ok(Reply::Ok)
        }
        "SCHEDULELIST" => {
            let id = parse_int(args.first(), "game id")?;
            let all = schedules.list(session, id)?;
            Ok(Reply::List(all.iter().map(format_schedule).collect()))
        }
        "SCHEDULESHOW" => {
            let id = parse_int(args.first(), "game id")?;
            let mut time_limit = None;
            let mut turn_limit = 10;
            let mut iter = args[1..].iter();
            while let Some(token) = iter.next() {
                match token.to_ascii_uppercase().as_str() {
                    "TIMELIMIT" => time_limit = Some(parse_int(iter.next(), "time limit")?),
                    "TURNLIMIT" => turn_limit = parse_int(iter.next(), "turn limit")?,
                    other => return Err(invalid(other)),
                }
            }
            let times = schedules.preview(session, id, time_limit, turn_limit)?;
            Ok(Reply::List(times.iter().map(|t| t.0.to_string()).collect()))
        }
        "PLAYERJOIN" | "PLAYERSUBST" | "PLAYERRESIGN" => {
            let id = parse_int(args.first(), "game id")?;
            let slot = parse_int(args.get(1), "slot")?;
            let user = args.get(2).ok_or_else(|| invalid("user"))?;
            match verb {
                "PLAYERJOIN" => players.join(session, id, slot, user)?,
                "PLAYERSUBST" => players.substitute(session, id, slot, user)?,
                _ => players.resign(session, id, slot, user)?,
            }
            Ok(Reply::Ok)
        }
        "PLAYERADD" => {
            let id = parse_int(args.first(), "game id")?;
            let user = args.get(1).ok_or_else(|| invalid("user"))?;
            players.add(session, id, user)?;
            Ok(Reply::Ok)
        }
        "GAMEHIST" => {
            let id = parse_int(args.first(), "game id")?;
            let limit = args.get(1).and_then(|n| n.parse().ok());
            Ok(Reply::List(history.game_history(session, id, limit)?))
        }
        "USERHIST" => {
            let user = args.first().ok_or_else(|| invalid("user"))?;
            let limit = args.get(1).and_then(|n| n.parse().ok());
            Ok(Reply::List(history.user_history(session, user, limit)?))
        }
        other => Err(invalid(other)),
    }
}
