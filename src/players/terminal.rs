//! Human player at a terminal.

use super::{MoveRequest, Player};
use crate::games::ultimate::{Board, Coordinate, GRID_CELLS, Move, Owner};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout,
};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

/// Line input shared by every local player, so two people at one keyboard
/// read from a single buffer.
pub type SharedInput<R> = Arc<Mutex<R>>;

/// Human player typing cell indices (0-8).
pub struct TerminalPlayer<R, W> {
    name: String,
    input: SharedInput<R>,
    output: W,
    forced: Option<Coordinate>,
}

impl TerminalPlayer<BufReader<Stdin>, Stdout> {
    /// Creates a player on the process's stdin and stdout.
    pub fn stdio(name: impl Into<String>, input: SharedInput<BufReader<Stdin>>) -> Self {
        Self::new(name, input, tokio::io::stdout())
    }

    /// Buffered stdin to hand to [`TerminalPlayer::stdio`].
    pub fn shared_stdin() -> SharedInput<BufReader<Stdin>> {
        Arc::new(Mutex::new(BufReader::new(tokio::io::stdin())))
    }
}

impl<R, W> TerminalPlayer<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// Creates a player reading from `input` and writing prompts to `output`.
    pub fn new(name: impl Into<String>, input: SharedInput<R>, output: W) -> Self {
        Self {
            name: name.into(),
            input,
            output,
            forced: None,
        }
    }

    /// Everything written so far goes here.
    pub fn output(&self) -> &W {
        &self.output
    }

    async fn say(&mut self, text: &str) -> Result<()> {
        self.output
            .write_all(text.as_bytes())
            .await
            .context("Failed to write to terminal")?;
        self.output.flush().await.context("Failed to flush terminal")
    }

    /// Prompts until the user enters 0-8. `None` means quit.
    async fn prompt_index(&mut self, scope: &str) -> Result<Option<usize>> {
        loop {
            self.say(&format!("Where are you going (0 - 8) in {}\n", scope))
                .await?;

            let mut line = String::new();
            let read = self
                .input
                .lock()
                .await
                .read_line(&mut line)
                .await
                .context("Failed to read from terminal")?;
            if read == 0 {
                debug!("Input closed, treating as quit");
                return Ok(None);
            }

            let entry = line.trim();
            if entry.eq_ignore_ascii_case("q") || entry.eq_ignore_ascii_case("quit") {
                return Ok(None);
            }

            match entry.parse::<usize>() {
                Ok(index) if index < GRID_CELLS => return Ok(Some(index)),
                _ => {
                    self.say("Enter a number from 0 to 8, or q to quit\n").await?;
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl<R, W> Player for TerminalPlayer<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    #[instrument(skip(self, board), fields(player = %self.name))]
    async fn present_state(&mut self, board: &Board, mover: Owner) -> Result<()> {
        self.forced = board.cur_cell();
        self.say(&format!("{}'s turn:\n{}\n", mover, board.render_terminal()))
            .await
    }

    #[instrument(skip(self), fields(player = %self.name))]
    async fn request_move(&mut self) -> Result<MoveRequest> {
        let large = match self.forced {
            Some(forced) => forced,
            None => match self.prompt_index("large cells").await? {
                Some(index) => cell_at(index)?,
                None => return Ok(MoveRequest::Quit),
            },
        };

        let small = match self.prompt_index("small cells").await? {
            Some(index) => cell_at(index)?,
            None => return Ok(MoveRequest::Quit),
        };

        Ok(MoveRequest::Play(Move::new(large, small)))
    }

    #[instrument(skip(self, _board), fields(player = %self.name))]
    async fn report_outcome(&mut self, _board: &Board, valid: bool) -> Result<()> {
        if valid {
            Ok(())
        } else {
            self.say("invalid move\n").await
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_local(&self) -> bool {
        true
    }
}

fn cell_at(index: usize) -> Result<Coordinate> {
    Coordinate::from_index(index)
        .ok_or_else(|| anyhow::anyhow!("Index {} is off the grid", index))
}
