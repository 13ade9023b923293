use rmcp::{
    RoleServer, ServerHandler,
    handler::server::{router::tool::ToolRouter, tool::ToolCallContext, wrapper::Parameters},
    model::*,
    service::RequestContext,
    tool, tool_router,
};

use crate::core::provider::TimeServer;
use crate::core::{
    error::{McpResult, TimeServerError},
    models::{GetCurrentTimeRequest, GetTimezoneOffsetRequest},
    utils::format_hour_offset,
};

/// Time MCP Server with current-time and timezone-offset tools
#[derive(Clone)]
pub struct TimeService {
    time_server: TimeServer,
    local_timezone_name: String, // Cache this
    tool_router: ToolRouter<TimeService>,
}

impl TimeService {
    pub fn new() -> Self {
        Self::with_time_server(TimeServer::new())
    }

    pub(crate) fn with_time_server(time_server: TimeServer) -> Self {
        let local_timezone_name = time_server.local_timezone.to_string();

        Self {
            time_server,
            local_timezone_name,
            tool_router: Self::tool_router(),
        }
    }

    fn create_resource_text(&self, uri: &str, name: &str) -> Resource {
        RawResource::new(uri, name.to_string()).no_annotation()
    }

    pub(crate) fn get_local_timezone_name(&self) -> &str {
        &self.local_timezone_name
    }

    fn generate_status_content(&self) -> McpResult<String> {
        let current_time = self
            .time_server
            .get_current_time(None, Default::default())?;

        Ok(format!(
            r#"Time MCP Server Status

Server: Running
Local Timezone: {}
Current Time (UTC): {}
Tools Available: 2
Resources Available: 2

Capabilities:
- Current time queries in iso, unix, and locale formats
- Whole-hour UTC offset lookup for any IANA timezone
- Local timezone detection"#,
            self.local_timezone_name, current_time
        ))
    }

    fn generate_help_content(&self) -> String {
        format!(
            r#"Time MCP Server Help

TOOLS:
- get_current_time: Get the current date and time
  - timezone: IANA timezone name (optional, defaults to system timezone)
  - format: "iso", "unix", or "locale" (optional, defaults to "iso")
  - Example: {{"timezone": "Asia/Tokyo", "format": "locale"}}

- get_timezone_offset: Get the timezone offset for a specific timezone
  - timezone: IANA timezone name (required)
  - Example: {{"timezone": "America/New_York"}}

RESOURCES:
- time://status: Current server status and local time
- time://help: This help documentation

LOCAL TIMEZONE: {}

TIMEZONE FORMAT:
- Use full IANA names: 'America/New_York', 'Europe/London'
- Avoid abbreviations: 'EST', 'PST' (ambiguous)

NOTES:
- The "iso" format with an explicit timezone returns the wall-clock time in
  that zone with a trailing 'Z'; the value is local to the zone, not UTC.
- Offsets are approximated in whole hours; zones offset by :30 or :45 from
  UTC are collapsed to the nearest comparison of hour components."#,
            self.local_timezone_name
        )
    }
}

impl Default for TimeService {
    fn default() -> Self {
        Self::new()
    }
}

/// Tool-level error payload for a name the router does not know.
fn unknown_tool_result(name: &str) -> CallToolResult {
    CallToolResult::error(vec![Content::text(format!("Error: Unknown tool: {name}"))])
}

#[tool_router]
impl TimeService {
    #[tool(description = "Get the current date and time")]
    pub(crate) async fn get_current_time(
        &self,
        Parameters(req): Parameters<GetCurrentTimeRequest>,
    ) -> McpResult<CallToolResult> {
        let rendered = self
            .time_server
            .get_current_time(req.timezone.as_deref(), req.format)?;

        Ok(CallToolResult::success(vec![Content::text(format!(
            "Current time: {rendered}"
        ))]))
    }

    #[tool(description = "Get the timezone offset for a specific timezone")]
    pub(crate) async fn get_timezone_offset(
        &self,
        Parameters(req): Parameters<GetTimezoneOffsetRequest>,
    ) -> McpResult<CallToolResult> {
        let Some(timezone) = req.timezone.as_deref() else {
            return Ok(CallToolResult::error(vec![Content::text(
                "Error: Timezone parameter is required",
            )]));
        };

        match self.time_server.get_timezone_offset(timezone) {
            Ok(offset) => Ok(CallToolResult::success(vec![Content::text(format!(
                "Timezone {timezone} offset: {} hours from UTC",
                format_hour_offset(offset)
            ))])),
            Err(err @ TimeServerError::InvalidTimezone { .. }) => Ok(CallToolResult::error(vec![
                Content::text(format!("Error: {err}")),
            ])),
            Err(other) => Err(other.into()),
        }
    }
}

impl ServerHandler for TimeService {
    fn get_info(&self) -> ServerInfo {
        let local_tz = self.get_local_timezone_name();
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_resources()
                .enable_tools()
                .build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(format!(
                "Time MCP Server. Tools: get_current_time, get_timezone_offset. Local timezone: {}. Use IANA timezone names.",
                local_tz
            )),
        }
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> McpResult<CallToolResult> {
        // An unrecognized tool name answers in-band, not as a protocol error.
        if !self.tool_router.has_route(request.name.as_ref()) {
            return Ok(unknown_tool_result(&request.name));
        }

        let context = ToolCallContext::new(self, request, context);
        self.tool_router.call(context).await
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> McpResult<ListToolsResult> {
        Ok(ListToolsResult {
            next_cursor: None,
            tools: self.tool_router.list_all(),
        })
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _: RequestContext<rmcp::RoleServer>,
    ) -> McpResult<ListResourcesResult> {
        Ok(ListResourcesResult {
            resources: vec![
                self.create_resource_text("time://status", "server-status"),
                self.create_resource_text("time://help", "help-documentation"),
            ],
            next_cursor: None,
        })
    }

    async fn read_resource(
        &self,
        ReadResourceRequestParam { uri }: ReadResourceRequestParam,
        _: RequestContext<rmcp::RoleServer>,
    ) -> McpResult<ReadResourceResult> {
        match uri.as_str() {
            "time://status" => {
                let status = self.generate_status_content()?;
                Ok(ReadResourceResult {
                    contents: vec![ResourceContents::text(status, uri)],
                })
            }
            "time://help" => {
                let help = self.generate_help_content();
                Ok(ReadResourceResult {
                    contents: vec![ResourceContents::text(help, uri)],
                })
            }
            _ => Err(TimeServerError::ResourceNotFound {
                uri: uri.to_string(),
            }
            .into()),
        }
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParam>,
        _: RequestContext<rmcp::RoleServer>,
    ) -> McpResult<ListResourceTemplatesResult> {
        Ok(ListResourceTemplatesResult {
            next_cursor: None,
            resource_templates: Vec::new(),
        })
    }

    async fn initialize(
        &self,
        _request: InitializeRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> McpResult<InitializeResult> {
        tracing::info!("Time MCP Server initialized successfully");
        Ok(self.get_info())
    }
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    use rmcp::{ServiceExt, transport::stdio};

    let service = TimeService::new().serve(stdio()).await.inspect_err(|e| {
        tracing::error!("serving error: {:?}", e);
    })?;

    service.waiting().await?;
    Ok(())
}
