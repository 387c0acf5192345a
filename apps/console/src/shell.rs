//! Interactive line-oriented front end.
//!
//! The shell plays the part of the two browser pages: it reads commands,
//! forwards them to the page controllers and prints alerts and the user
//! table. Errors are shown as alerts and never end the session.

use auth::SessionStore;
use entities::{Alert, Profile, UserRecord};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};
use tracing::{debug, error};

use crate::login::{LoginController, LoginState, Page};
use crate::render::{render_alert, render_table};
use crate::users::{UserForm, UsersController};
use crate::{ConsoleError, ConsoleResult};

const LOGIN_HELP: &str = "\
Comandos:
  login <email> <senha>   entrar
  forgot <email>          esqueci a senha
  help                    esta ajuda
  quit                    sair";

const USERS_HELP: &str = "\
Comandos:
  list                    listar usuários
  search [termo]          filtrar por nome ou e-mail
  new                     cadastrar usuário
  edit <id>               editar usuário
  toggle <id>             ativar/inativar usuário
  clear                   limpar formulário
  logout                  sair da conta
  help                    esta ajuda
  quit                    sair";

/// Whether the shell keeps reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// The interactive front end.
pub struct Shell {
    login: LoginController,
    users: UsersController,
    session: SessionStore,
    page: Page,
    form: UserForm,
}

impl Shell {
    /// Creates a shell on the login page.
    pub fn new(login: LoginController, users: UsersController, session: SessionStore) -> Self {
        Self {
            login,
            users,
            session,
            page: Page::Login,
            form: UserForm::default(),
        }
    }

    /// Current page.
    pub fn page(&self) -> Page {
        self.page
    }

    /// Reads commands from `input` until it ends or the user quits.
    ///
    /// Starts on the users page when a session token is already stored.
    pub async fn run<R, W>(&mut self, input: R, output: &mut W) -> ConsoleResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();

        self.page = if self.session.is_authenticated().await? {
            Page::Users
        } else {
            Page::Login
        };
        self.enter_page(output).await?;

        loop {
            let prompt = match self.page {
                Page::Login => "login> ",
                Page::Users => "usuarios> ",
            };
            output.write_all(prompt.as_bytes()).await?;
            output.flush().await?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            match self.dispatch(line.trim_start(), &mut lines, output).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(ConsoleError::Io(e)) => return Err(ConsoleError::Io(e)),
                Err(e) => {
                    error!(error = %e, "Command failed");
                    write_alert(output, &Alert::err(e.to_string())).await?;
                }
            }
        }

        write_line(output, "Até logo.").await
    }

    async fn enter_page<W: AsyncWrite + Unpin>(&mut self, output: &mut W) -> ConsoleResult<()> {
        match self.page {
            Page::Login => write_line(output, "== Login == (digite 'help')").await,
            Page::Users => {
                self.form = UserForm::default();
                write_line(output, "== Usuários == (digite 'help')").await?;
                let users = self.users.load().await?;
                write_table(output, &users).await
            }
        }
    }

    async fn dispatch<R, W>(
        &mut self,
        line: &str,
        lines: &mut Lines<R>,
        output: &mut W,
    ) -> ConsoleResult<Flow>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let (command, raw_rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = raw_rest.trim();
        debug!(command, page = ?self.page, "Dispatching command");

        match (command, self.page) {
            ("", _) => {}
            ("quit" | "exit" | "sair", _) => return Ok(Flow::Quit),
            ("help", Page::Login) => write_line(output, LOGIN_HELP).await?,
            ("help", Page::Users) => write_line(output, USERS_HELP).await?,

            ("login", Page::Login) => {
                // The password is taken verbatim up to the end of the line
                let credentials = raw_rest
                    .trim_start()
                    .split_once(char::is_whitespace)
                    .map(|(email, password)| (email, password.trim_start()))
                    .filter(|(_, password)| !password.is_empty());
                let Some((email, password)) = credentials else {
                    write_alert(output, &Alert::warn("Uso: login <email> <senha>")).await?;
                    return Ok(Flow::Continue);
                };
                let outcome = self.login.submit(email, password).await?;
                write_alert(output, &outcome.alert).await?;

                if let (LoginState::AuthSucceeded, Some(navigation)) =
                    (outcome.state, outcome.navigation)
                {
                    tokio::time::sleep(navigation.after).await;
                    self.page = navigation.page;
                    self.enter_page(output).await?;
                }
            }
            ("forgot", Page::Login) => {
                let alert = self.login.forgot_password(rest).await?;
                write_alert(output, &alert).await?;
            }

            ("list", Page::Users) => {
                let users = self.users.load().await?;
                write_table(output, &users).await?;
            }
            ("search", Page::Users) => {
                let users = self.users.search(rest).await?;
                write_table(output, &users).await?;
            }
            ("new", Page::Users) => {
                self.form = self.users.clear();
                return self.fill_and_submit(lines, output).await;
            }
            ("edit", Page::Users) => match self.users.edit(rest).await? {
                Some(form) => {
                    self.form = form;
                    return self.fill_and_submit(lines, output).await;
                }
                None => write_alert(output, &Alert::warn("Usuário não encontrado.")).await?,
            },
            ("toggle", Page::Users) => {
                let users = self.users.toggle(rest).await?;
                write_table(output, &users).await?;
            }
            ("clear", Page::Users) => {
                self.form = self.users.clear();
                write_line(output, "Formulário limpo.").await?;
            }
            ("logout", Page::Users) => {
                self.users.logout().await?;
                self.page = Page::Login;
                self.enter_page(output).await?;
            }

            (other, _) => {
                write_alert(
                    output,
                    &Alert::warn(format!("Comando desconhecido: {other}. Digite 'help'.")),
                )
                .await?;
            }
        }

        Ok(Flow::Continue)
    }

    /// Prompts for every form field, then saves the form.
    async fn fill_and_submit<R, W>(
        &mut self,
        lines: &mut Lines<R>,
        output: &mut W,
    ) -> ConsoleResult<Flow>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut form = self.form.clone();

        let Some(name) = prompt(lines, output, "Nome", &form.name).await? else {
            return Ok(Flow::Quit);
        };
        form.name = name;

        let Some(email) = prompt(lines, output, "E-mail", &form.email).await? else {
            return Ok(Flow::Quit);
        };
        form.email = email;

        let current = form.profile.to_string();
        let Some(profile) = prompt(lines, output, "Perfil (ADMIN/USER)", &current).await? else {
            return Ok(Flow::Quit);
        };
        match profile.parse::<Profile>() {
            Ok(profile) => form.profile = profile,
            Err(_) => {
                write_alert(output, &Alert::warn("Perfil inválido; mantido o anterior.")).await?
            }
        }

        let current = if form.active { "s" } else { "n" };
        let Some(active) = prompt(lines, output, "Ativo (s/n)", current).await? else {
            return Ok(Flow::Quit);
        };
        form.active = parse_yes_no(&active).unwrap_or(form.active);

        let hint = form.password_hint();
        let Some(password) = prompt(lines, output, hint, "").await? else {
            return Ok(Flow::Quit);
        };
        form.password = password;

        let submission = self.users.submit(&mut form).await?;
        self.form = form;
        write_alert(output, &submission.alert).await?;
        if let Some(users) = submission.users {
            write_table(output, &users).await?;
        }

        Ok(Flow::Continue)
    }
}

/// Asks for one field. Blank input keeps `current`; `None` means input ended.
async fn prompt<R, W>(
    lines: &mut Lines<R>,
    output: &mut W,
    label: &str,
    current: &str,
) -> ConsoleResult<Option<String>>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let text = if current.is_empty() {
        format!("{label}: ")
    } else {
        format!("{label} [{current}]: ")
    };
    output.write_all(text.as_bytes()).await?;
    output.flush().await?;

    let Some(line) = lines.next_line().await? else {
        return Ok(None);
    };
    let value = line.trim();
    if value.is_empty() {
        Ok(Some(current.to_string()))
    } else {
        Ok(Some(value.to_string()))
    }
}

fn parse_yes_no(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "s" | "sim" | "y" | "yes" | "1" => Some(true),
        "n" | "nao" | "não" | "no" | "0" => Some(false),
        _ => None,
    }
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> ConsoleResult<()> {
    output.write_all(text.as_bytes()).await?;
    output.write_all(b"\n").await?;
    Ok(())
}

async fn write_alert<W: AsyncWrite + Unpin>(output: &mut W, alert: &Alert) -> ConsoleResult<()> {
    write_line(output, &render_alert(alert)).await
}

async fn write_table<W: AsyncWrite + Unpin>(
    output: &mut W,
    users: &[UserRecord],
) -> ConsoleResult<()> {
    write_line(output, &render_table(users)).await
}
