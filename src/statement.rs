//! Statements: command text, positional parameters and execution.

use crate::connection::Connection;
use crate::cursor::DataReader;
use crate::error::{Error, Result};
use crate::protocol::constants::*;
use crate::protocol::messages::{encode_parameters, CreateCursorMessage, ExecuteMessage};
use crate::protocol::transport::{HttpTransport, Transport};
use crate::protocol::types::DbValue;
use std::time::Duration;

/// How the command text is interpreted. Only `Text` is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandType {
    #[default]
    Text,
    StoredProcedure,
    TableDirect,
}

/// Parameter direction. Only `Input` is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParameterDirection {
    #[default]
    Input,
    Output,
    InputOutput,
    ReturnValue,
}

/// Execution hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecuteBehavior {
    #[default]
    Default,
    /// Only the first row is wanted; fetches ask for one row at a time.
    SingleRow,
}

impl ExecuteBehavior {
    fn batch_size(self) -> u32 {
        match self {
            ExecuteBehavior::Default => BATCH_SIZE,
            ExecuteBehavior::SingleRow => SINGLE_ROW_BATCH_SIZE,
        }
    }
}

/// A bound parameter.
///
/// The name is informational: binding is by position, in the order
/// parameters were added.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub value: DbValue,
    pub direction: ParameterDirection,
}

impl Parameter {
    /// Create an input parameter.
    pub fn new(name: impl Into<String>, value: impl Into<DbValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            direction: ParameterDirection::Input,
        }
    }

    /// Set the direction.
    pub fn with_direction(mut self, direction: ParameterDirection) -> Self {
        self.direction = direction;
        self
    }
}

/// Remote cursor held by a statement.
#[derive(Debug, Clone)]
pub(crate) struct ActiveCursor {
    pub cursor_id: String,
    pub base_url: String,
}

/// A command against an open [`Connection`].
///
/// A statement holds at most one live remote cursor. Changing the command
/// text, executing again, or closing the statement releases it.
pub struct Statement<T: Transport = HttpTransport> {
    connection: Connection<T>,
    command_text: String,
    command_type: CommandType,
    parameters: Vec<Parameter>,
    timeout_secs: u32,
    pub(crate) active_cursor: Option<ActiveCursor>,
}

impl<T: Transport> Statement<T> {
    pub(crate) fn new(connection: Connection<T>) -> Self {
        Self {
            connection,
            command_text: String::new(),
            command_type: CommandType::Text,
            parameters: Vec::new(),
            timeout_secs: DEFAULT_COMMAND_TIMEOUT_SECS,
            active_cursor: None,
        }
    }

    /// The owning connection.
    pub fn connection(&self) -> &Connection<T> {
        &self.connection
    }

    pub fn command_text(&self) -> &str {
        &self.command_text
    }

    /// Set the command text, discarding any active cursor.
    pub async fn set_command_text(&mut self, text: impl Into<String>) {
        self.release_active_cursor().await;
        self.command_text = text.into();
    }

    pub fn command_type(&self) -> CommandType {
        self.command_type
    }

    /// Only [`CommandType::Text`] is accepted.
    pub fn set_command_type(&mut self, command_type: CommandType) -> Result<()> {
        if command_type != CommandType::Text {
            return Err(Error::unsupported(format!(
                "command type {:?}",
                command_type
            )));
        }
        self.command_type = command_type;
        Ok(())
    }

    /// Timeout in seconds applied to every remote call (`0` = none).
    pub fn timeout_secs(&self) -> u32 {
        self.timeout_secs
    }

    pub fn set_timeout(&mut self, seconds: u32) {
        self.timeout_secs = seconds;
    }

    pub(crate) fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(u64::from(self.timeout_secs)))
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Append an input parameter.
    pub fn add_parameter(&mut self, name: impl Into<String>, value: impl Into<DbValue>) {
        self.parameters.push(Parameter::new(name, value));
    }

    /// Append a parameter. Only input parameters are accepted.
    pub fn add(&mut self, parameter: Parameter) -> Result<()> {
        if parameter.direction != ParameterDirection::Input {
            return Err(Error::unsupported(format!(
                "{:?} parameter '{}'",
                parameter.direction, parameter.name
            )));
        }
        self.parameters.push(parameter);
        Ok(())
    }

    pub fn clear_parameters(&mut self) {
        self.parameters.clear();
    }

    /// Id of the live remote cursor, if any.
    pub fn active_cursor_id(&self) -> Option<&str> {
        self.active_cursor.as_ref().map(|c| c.cursor_id.as_str())
    }

    /// No-op: the bridge has no separate prepare phase.
    pub fn prepare(&mut self) -> Result<()> {
        Ok(())
    }

    /// The bridge exposes no cancellation endpoint.
    pub fn cancel(&self) -> Result<()> {
        Err(Error::unsupported("statement cancellation"))
    }

    /// Execute the command and return a reader positioned before the first row.
    ///
    /// The first batch is already fetched, so column names are available
    /// immediately.
    pub async fn execute(&mut self) -> Result<DataReader<'_, T>> {
        self.execute_with(ExecuteBehavior::Default).await
    }

    /// Execute with an explicit behavior hint.
    pub async fn execute_with(&mut self, behavior: ExecuteBehavior) -> Result<DataReader<'_, T>> {
        let session = self
            .connection
            .open_session()
            .ok_or_else(|| Error::invalid_state("connection is not open"))?;
        if self.command_text.trim().is_empty() {
            return Err(Error::invalid_state("command text is empty"));
        }
        let parameters = encode_parameters(self.parameters.iter().map(|p| &p.value))?;

        // A previous reader may have been dropped without closing.
        self.release_active_cursor().await;

        let timeout = self.timeout();
        let created = self
            .connection
            .call(
                &CreateCursorMessage {
                    connection_id: &session.connection_id,
                },
                &session.base_url,
                timeout,
            )
            .await?;
        let cursor_id = created.cursor_id;
        self.active_cursor = Some(ActiveCursor {
            cursor_id: cursor_id.clone(),
            base_url: session.base_url.clone(),
        });

        tracing::debug!(
            cursor_id = %cursor_id,
            params_count = parameters.len(),
            "executing statement"
        );
        let executed = self
            .connection
            .call(
                &ExecuteMessage {
                    cursor_id: &cursor_id,
                    query: &self.command_text,
                    parameters,
                },
                &session.base_url,
                timeout,
            )
            .await;
        let executed = match executed {
            Ok(reply) => reply,
            Err(e) => {
                self.release_active_cursor().await;
                return Err(e);
            }
        };

        DataReader::open(
            self,
            cursor_id,
            session.base_url,
            timeout,
            behavior.batch_size(),
            executed,
        )
        .await
    }

    /// Execute and return the records-affected count, or `-1` when the
    /// service does not report one.
    pub async fn execute_non_query(&mut self) -> Result<i64> {
        let mut reader = self.execute().await?;
        let affected = reader.records_affected();
        reader.close().await;
        Ok(affected)
    }

    /// Execute and return the first column of the first row.
    ///
    /// `None` means the query produced no row; a NULL cell is
    /// `Some(DbValue::Null)`.
    pub async fn execute_scalar(&mut self) -> Result<Option<DbValue>> {
        let mut reader = self.execute_with(ExecuteBehavior::SingleRow).await?;
        let value = first_value(&mut reader).await;
        reader.close().await;
        value
    }

    /// Release the active cursor. Safe to call any number of times.
    pub async fn close(&mut self) {
        self.release_active_cursor().await;
    }

    pub(crate) async fn release_active_cursor(&mut self) {
        if let Some(active) = self.active_cursor.take() {
            let timeout = self.timeout();
            self.connection
                .release_cursor(&active.base_url, &active.cursor_id, timeout)
                .await;
        }
    }
}

async fn first_value<T: Transport>(reader: &mut DataReader<'_, T>) -> Result<Option<DbValue>> {
    if reader.read().await? && reader.field_count() > 0 {
        Ok(Some(reader.value(0)?.clone()))
    } else {
        Ok(None)
    }
}

impl<T: Transport> Drop for Statement<T> {
    fn drop(&mut self) {
        if let Some(active) = &self.active_cursor {
            tracing::warn!(
                cursor_id = %active.cursor_id,
                "statement dropped with a live cursor; call close() to release it"
            );
        }
    }
}
