//! REPL 模式（交互式 Shell）
//!
//! 专用输入线程 + 有界通道：rustyline 在自己的线程里阻塞读取并保留历史，
//! 主任务通过 `tokio::select!` 同时等待输入与 Ctrl+C。

use anyhow::{Result, anyhow};
use crossbeam_channel::{Receiver, bounded};
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use std::path::{Path, PathBuf};
use std::thread;

use crate::session::{Session, help_lines};

/// 输入线程发给主任务的消息
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Line(String),
    Interrupted,
    Exit,
}

/// REPL 输入（专用输入线程）
struct ReplInput {
    rx: Receiver<Input>,
    _input_thread: thread::JoinHandle<Result<()>>,
}

impl ReplInput {
    fn new() -> Self {
        let (tx, rx) = bounded::<Input>(10);

        // Editor 在输入线程内创建，生命周期与会话相同
        let input_thread = thread::spawn(move || {
            let mut rl = Editor::<(), DefaultHistory>::new()
                .map_err(|e| anyhow!("Failed to initialize readline: {}", e))?;
            let history = history_path();
            if let Some(path) = &history {
                rl.load_history(path).ok();
            }

            loop {
                match rl.readline("ace> ") {
                    Ok(line) => {
                        let line = line.trim().to_string();
                        if line.is_empty() {
                            continue;
                        }
                        let _ = rl.add_history_entry(line.as_str());
                        if line == "exit" || line == "quit" {
                            let _ = tx.send(Input::Exit);
                            break;
                        }
                        if tx.send(Input::Line(line)).is_err() {
                            break;
                        }
                    },
                    Err(ReadlineError::Interrupted) => {
                        println!("^C");
                        let _ = tx.send(Input::Interrupted);
                    },
                    Err(ReadlineError::Eof) => {
                        let _ = tx.send(Input::Exit);
                        break;
                    },
                    Err(err) => {
                        eprintln!("Error: {:?}", err);
                        let _ = tx.send(Input::Exit);
                        break;
                    },
                }
            }

            if let Some(path) = &history {
                rl.save_history(path).ok();
            }
            Ok(())
        });

        Self {
            rx,
            _input_thread: input_thread,
        }
    }

    /// 等待下一条输入（输入线程退出后返回 `None`）
    async fn recv(&self) -> Option<Input> {
        let rx = self.rx.clone();
        tokio::task::spawn_blocking(move || rx.recv()).await.ok().and_then(|r| r.ok())
    }
}

fn history_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("ace_cli_history"))
}

/// 运行 REPL
pub async fn run_repl(config: &Path) -> Result<()> {
    let session = Session::load(config)?;
    let input = ReplInput::new();

    println!("ACE CLI v{} - {}", env!("CARGO_PKG_VERSION"), config.display());
    println!("Type 'help' for commands, 'exit' to quit");
    println!();

    loop {
        tokio::select! {
            message = input.recv() => {
                match message {
                    Some(Input::Line(line)) => match line.as_str() {
                        "help" => {
                            for out in help_lines() {
                                println!("{}", out);
                            }
                        },
                        _ => match session.handle(&line) {
                            Ok(output) => {
                                for out in output {
                                    println!("{}", out);
                                }
                            },
                            Err(err) => eprintln!("❌ {}", err),
                        },
                    },
                    Some(Input::Interrupted) => continue,
                    Some(Input::Exit) | None => break,
                }
            }

            _ = tokio::signal::ctrl_c() => {
                eprintln!();
                break;
            }
        }
    }

    Ok(())
}
