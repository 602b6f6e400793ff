// Connection profile endpoints (FTP read-only, mail CRUD)

use tracing::debug;

use crate::client::BackendClient;
use crate::error::Error;
use crate::models::{Ack, FtpConnectionDto, MailConnectionDto, NewMailConnection};

impl BackendClient {
    /// List FTP connection profiles.
    ///
    /// `GET /ftp/connections`
    pub async fn list_ftp_profiles(&self) -> Result<Vec<FtpConnectionDto>, Error> {
        let url = self.url("ftp/connections")?;
        self.get(url).await
    }

    /// List mail connection profiles (passwords are never returned).
    ///
    /// `GET /api/mail/connections`
    pub async fn list_mail_profiles(&self) -> Result<Vec<MailConnectionDto>, Error> {
        let url = self.url("api/mail/connections")?;
        self.get(url).await
    }

    /// Create a mail connection profile and return the stored record.
    ///
    /// `POST /api/mail/add_connection`
    pub async fn add_mail_profile(
        &self,
        profile: &NewMailConnection,
    ) -> Result<MailConnectionDto, Error> {
        let url = self.url("api/mail/add_connection")?;
        let ack: Ack<MailConnectionDto> = self.post(url, profile).await?;

        match ack.connection {
            Some(conn) if ack.success => {
                debug!(id = %conn.id, "mail profile created");
                Ok(conn)
            }
            _ => Err(Error::Api {
                status: 200,
                message: ack
                    .message
                    .unwrap_or_else(|| "backend did not return the created profile".into()),
            }),
        }
    }

    /// Delete a mail connection profile, returning the confirmation text.
    ///
    /// `DELETE /api/mail/delete_connection/{id}`
    pub async fn delete_mail_profile(&self, id: &str) -> Result<String, Error> {
        let url = self.url(&format!("api/mail/delete_connection/{id}"))?;
        let ack: Ack<MailConnectionDto> = self.delete(url).await?;
        Ok(ack.message.unwrap_or_else(|| "Connection deleted".into()))
    }
}
