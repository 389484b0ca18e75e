use coindash_core::{
    FeedbackPipeline, FileStore, GameConfig, GenerativeTextService, MessageBoard, RoundOutcome,
    RoundUpdate, ServiceError, SessionController, SessionStore, TextService,
};

/// Stand-in service for offline play; every request falls back.
struct OfflineService;

impl TextService for OfflineService {
    fn generate(&self, _prompt: &str) -> Result<String, ServiceError> {
        Err(ServiceError::Request("offline".to_string()))
    }
}

fn main() {
    let mut config = GameConfig::default();
    if let Ok(key) = std::env::var("COINDASH_API_KEY") {
        config.feedback.api_key = key;
    }

    let pipeline = if config.feedback.api_key.is_empty() {
        println!("COINDASH_API_KEY not set; feedback uses fallback text");
        FeedbackPipeline::new(OfflineService)
    } else {
        match GenerativeTextService::new(&config.feedback) {
            Ok(service) => FeedbackPipeline::new(service),
            Err(err) => {
                println!("feedback service unavailable ({}), using fallbacks", err);
                FeedbackPipeline::new(OfflineService)
            }
        }
    };

    let store = SessionStore::new(FileStore::open("coindash_session.json"));
    let display = config.clone();
    let mut session = SessionController::new(config, store);
    let mut board = MessageBoard::new();
    let mut now_ms: u64 = 0;

    println!("Coin Dash headless REPL (simulated clock)");
    print_help();

    let mut line = String::new();
    loop {
        line.clear();
        if std::io::stdin().read_line(&mut line).is_err() {
            break;
        }
        let mut words = line.split_whitespace();
        let cmd = match words.next() {
            Some(cmd) => cmd,
            None => {
                print_state(&session, &board, now_ms);
                continue;
            }
        };

        let update = match cmd {
            "q" | "quit" => break,
            "help" => {
                print_help();
                continue;
            }
            "state" => {
                print_state(&session, &board, now_ms);
                continue;
            }
            "new" => session.start_new_round(now_ms),
            "cont" => session.continue_round(now_ms),
            "reset" => session.reset(now_ms),
            "c" | "collect" => session.on_coin_collected(now_ms),
            "t" | "tick" => {
                let step: u64 = words
                    .next()
                    .and_then(|w| w.parse().ok())
                    .unwrap_or(1_000);
                now_ms += step;
                session.on_tick(now_ms)
            }
            other => {
                println!("unknown command: {}", other);
                continue;
            }
        };

        apply_update(&update, &pipeline, &mut board, &display, now_ms);
        board.pump(&pipeline, now_ms);
        board.update(now_ms);
        print_state(&session, &board, now_ms);
    }
}

fn apply_update(
    update: &RoundUpdate,
    pipeline: &FeedbackPipeline,
    board: &mut MessageBoard,
    display: &GameConfig,
    now_ms: u64,
) {
    if let Some(notice) = &update.notice {
        let notice_ms = match update.outcome {
            Some(RoundOutcome::TimedOut) => display.timeout_notice_ms,
            _ => display.win_notice_ms,
        };
        board.post(notice.clone(), now_ms, notice_ms);
    }
    if let Some(request) = update.feedback.clone() {
        pipeline.request(request);
    }
}

fn print_state(session: &SessionController, board: &MessageBoard, now_ms: u64) {
    println!(
        "t={}ms | {:?} | score {} | {}ms left",
        now_ms,
        session.phase(),
        session.score(),
        session.time_left_ms(now_ms)
    );
    if let Some(coin) = session.coin() {
        println!("  coin #{} at ({:.0}, {:.0})", coin.id, coin.x, coin.y);
    }
    for message in board.active() {
        println!("  [{}] {}", message.display_until_ms, message.text);
    }
}

fn print_help() {
    println!("Commands: new cont reset c(ollect) t(ick) [ms] state help q");
}
