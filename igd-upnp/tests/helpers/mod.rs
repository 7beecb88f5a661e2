//! Shared fixtures for the integration tests.
#![allow(dead_code)]

/// Two-level description: an internet gateway with one service of its own
/// and an embedded WAN device with one service. All URLs are relative, to
/// be resolved against the mock server's authority.
pub const TWO_LEVEL_DESCRIPTION: &str = r#"<?xml version="1.0"?>
<root xmlns="urn:schemas-upnp-org:device-1-0">
  <specVersion><major>1</major><minor>0</minor></specVersion>
  <device>
    <deviceType>urn:schemas-upnp-org:device:InternetGatewayDevice:1</deviceType>
    <friendlyName>FRITZ!Box 7590</friendlyName>
    <manufacturer>AVM Berlin</manufacturer>
    <modelName>FRITZ!Box 7590</modelName>
    <UDN>uuid:75802409-bccb-40e7-8e6c-989BCB2B93B0</UDN>
    <serviceList>
      <service>
        <serviceType>urn:schemas-any-com:service:Any:1</serviceType>
        <serviceId>urn:any-com:serviceId:any1</serviceId>
        <controlURL>/igdupnp/control/any</controlURL>
        <eventSubURL>/igdupnp/control/any</eventSubURL>
        <SCPDURL>/any.xml</SCPDURL>
      </service>
    </serviceList>
    <deviceList>
      <device>
        <deviceType>urn:schemas-upnp-org:device:WANDevice:1</deviceType>
        <friendlyName>WANDevice - FRITZ!Box 7590</friendlyName>
        <manufacturer>AVM Berlin</manufacturer>
        <UDN>uuid:76802409-bccb-40e7-8e6c-989BCB2B93B0</UDN>
        <serviceList>
          <service>
            <serviceType>urn:schemas-upnp-org:service:WANCommonInterfaceConfig:1</serviceType>
            <serviceId>urn:upnp-org:serviceId:WANCommonIFC1</serviceId>
            <controlURL>/igdupnp/control/WANCommonIFC1</controlURL>
            <eventSubURL>/igdupnp/control/WANCommonIFC1</eventSubURL>
            <SCPDURL>/igdicfgSCPD.xml</SCPDURL>
          </service>
        </serviceList>
      </device>
    </deviceList>
  </device>
</root>"#;

/// A single device with the WAN common interface configuration service.
pub const SINGLE_DEVICE_DESCRIPTION: &str = r#"<?xml version="1.0"?>
<root xmlns="urn:schemas-upnp-org:device-1-0">
  <device>
    <deviceType>urn:schemas-upnp-org:device:WANDevice:1</deviceType>
    <friendlyName>WANDevice</friendlyName>
    <UDN>uuid:76802409-bccb-40e7-8e6c-989BCB2B93B0</UDN>
    <serviceList>
      <service>
        <serviceType>urn:schemas-upnp-org:service:WANCommonInterfaceConfig:1</serviceType>
        <serviceId>urn:upnp-org:serviceId:WANCommonIFC1</serviceId>
        <controlURL>/igdupnp/control/WANCommonIFC1</controlURL>
        <eventSubURL>/igdupnp/control/WANCommonIFC1</eventSubURL>
        <SCPDURL>/igdicfgSCPD.xml</SCPDURL>
      </service>
    </serviceList>
  </device>
</root>"#;

/// Two sibling root devices in one document.
pub const SIBLING_ROOTS_DESCRIPTION: &str = r#"<?xml version="1.0"?>
<root xmlns="urn:schemas-upnp-org:device-1-0">
  <device>
    <friendlyName>First</friendlyName>
    <UDN>uuid:first</UDN>
  </device>
  <device>
    <friendlyName>Second</friendlyName>
    <UDN>uuid:second</UDN>
  </device>
</root>"#;

/// SCPD of the WAN common interface configuration service.
pub const WAN_SCPD: &str = r#"<?xml version="1.0"?>
<scpd xmlns="urn:schemas-upnp-org:service-1-0">
  <specVersion><major>1</major><minor>0</minor></specVersion>
  <actionList>
    <action>
      <name>GetAddonInfos</name>
      <argumentList>
        <argument>
          <name>NewByteSendRate</name>
          <direction>out</direction>
          <relatedStateVariable>ByteSendRate</relatedStateVariable>
        </argument>
        <argument>
          <name>NewByteReceiveRate</name>
          <direction>out</direction>
          <relatedStateVariable>ByteReceiveRate</relatedStateVariable>
        </argument>
      </argumentList>
    </action>
  </actionList>
  <serviceStateTable>
    <stateVariable sendEvents="no">
      <name>ByteSendRate</name>
      <dataType>ui4</dataType>
    </stateVariable>
    <stateVariable sendEvents="no">
      <name>ByteReceiveRate</name>
      <dataType>ui4</dataType>
    </stateVariable>
  </serviceStateTable>
</scpd>"#;

/// A minimal SCPD with one argument-less action.
pub const ANY_SCPD: &str = r#"<?xml version="1.0"?>
<scpd xmlns="urn:schemas-upnp-org:service-1-0">
  <actionList>
    <action><name>DoAnything</name></action>
  </actionList>
</scpd>"#;

/// Wrap an action reply body in a SOAP envelope.
pub fn soap_reply(body: &str) -> String {
    format!(
        r#"<?xml version="1.0"?><s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope"><s:Body>{}</s:Body></s:Envelope>"#,
        body
    )
}
