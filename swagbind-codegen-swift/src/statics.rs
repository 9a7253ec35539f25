//! Support code that every generated client shares.

use swagbind_core::codegen::SourceUnit;

use super::{config::GeneratorConfig, writer::SwiftWriter};

const UTILS: &str = r#"
extension Dictionary where Value == Any? {
    func unopt() -> [Key: Any] {
        return reduce(into: [Key: Any]()) { result, kv in
            if let value = kv.value {
                result[kv.key] = value
            }
        }
    }

    func unoptString() -> [Key: String] {
        return reduce(into: [Key: String]()) { result, kv in
            if let value = kv.value {
                result[kv.key] = String(describing: value)
            }
        }
    }
}

extension Dictionary where Key == String, Value == Any? {
    func multipartFormData() -> [MultipartFormData] {
        return unopt().sorted(by: { $0.key < $1.key }).map { key, value in
            if let file = value as? FileValue {
                return file.moyaFormData(name: key)
            }
            return MultipartFormData(provider: .data(Data(String(describing: value).utf8)), name: key)
        }
    }
}

extension Encodable {
    func jsonObject() -> Any? {
        guard let data = try? JSONEncoder().encode(self) else { return nil }
        return try? JSONSerialization.jsonObject(with: data, options: .allowFragments)
    }
}

extension JSONDecoder {
    func decodeSafe<T>(_ type: T.Type, from data: Data) throws -> T where T: Decodable {
        do {
            return try decode(type, from: data)
        } catch DecodingError.dataCorrupted(let context) {
            let value = try JSONSerialization.jsonObject(with: data, options: .allowFragments)
            if let result = value as? T {
                return result
            } else {
                throw DecodingError.dataCorrupted(context)
            }
        }
    }
}

{access} enum AnyObjectValue: Codable {
    case string(String)
    case int(Int)
    case double(Double)
    case bool(Bool)
    case object([String: AnyObjectValue])
    case array([AnyObjectValue])

    {access} init(from decoder: Decoder) throws {
        let container = try decoder.singleValueContainer()

        if let value = try? container.decode(String.self) {
            self = .string(value)
        } else if let value = try? container.decode(Int.self) {
            self = .int(value)
        } else if let value = try? container.decode(Double.self) {
            self = .double(value)
        } else if let value = try? container.decode(Bool.self) {
            self = .bool(value)
        } else if let value = try? container.decode([String: AnyObjectValue].self) {
            self = .object(value)
        } else if let value = try? container.decode([AnyObjectValue].self) {
            self = .array(value)
        } else {
            throw DecodingError.typeMismatch(AnyObjectValue.self, DecodingError.Context(codingPath: container.codingPath, debugDescription: "Not a JSON value"))
        }
    }

    {access} func encode(to encoder: Encoder) throws {
        var container = encoder.singleValueContainer()
        switch self {
        case .string(let value):
            try container.encode(value)
        case .int(let value):
            try container.encode(value)
        case .double(let value):
            try container.encode(value)
        case .bool(let value):
            try container.encode(value)
        case .object(let value):
            try container.encode(value)
        case .array(let value):
            try container.encode(value)
        }
    }
}

{access} enum FileValue {
    case data(value: Foundation.Data, fileName: String, mimeType: String)
    case url(value: Foundation.URL)

    func moyaFormData(name: String) -> MultipartFormData {
        switch self {
        case .data(let value, let fileName, let mimeType):
            return MultipartFormData(provider: .data(value), name: name, fileName: fileName, mimeType: mimeType)
        case .url(let value):
            return MultipartFormData(provider: .file(value), name: name)
        }
    }
}

{access} struct HTTPHeadersPlugin: PluginType {
    {access} typealias HTTPHeadersClosure = (URLRequest) -> [String: String]
    {access} let headersClosure: HTTPHeadersClosure

    {access} init(headersClosure: @escaping HTTPHeadersClosure) {
        self.headersClosure = headersClosure
    }

    {access} func prepare(_ request: URLRequest, target: TargetType) -> URLRequest {
        var request = request
        for (field, value) in headersClosure(request) {
            request.addValue(value, forHTTPHeaderField: field)
        }
        return request
    }
}
"#;

const RESPONSE_DECODING: &str = r#"
{access} enum ResponseDecodeError: Error {
    case unknownCode(Int)
}

{access} protocol TargetTypeResponse: TargetType {
    var responseTypes: [Int: Decodable.Type] { get }
    func decodeResponse(_ response: Moya.Response) throws -> Any
}

extension TargetTypeResponse {
    {access} func decodeResponse(_ response: Moya.Response) throws -> Any {
        guard let type = responseTypes[response.statusCode] else {
            throw ResponseDecodeError.unknownCode(response.statusCode)
        }
        return try type.decode(from: response.data)
    }
}

extension Decodable {
    static func decode(from data: Data) throws -> Self {
        return try JSONDecoder().decodeSafe(Self.self, from: data)
    }
}
"#;

const SERVER: &str = r#"
fileprivate let callbackQueue = DispatchQueue(label: "network.callback.queue")

{access} enum ServerError: Error {
    case invalidResponseCode(_: Int, _: Data)
    case connection(_: Error)
    case decoding(_: Error)
    case unknown(_: Error)
}

extension Result {
    func mappedError() -> Result<Success, ServerError> {
        return mapError { (error: Error) -> ServerError in
            if let error = error as? MoyaError, case .underlying(let underlying, _) = error {
                if (underlying as NSError).domain == NSURLErrorDomain {
                    return ServerError.connection(underlying)
                } else {
                    return ServerError.unknown(underlying)
                }
            } else if let error = error as? ServerError {
                return error
            } else {
                return ServerError.unknown(error)
            }
        }
    }
}

{class_access} class Server<Target: TargetType>: MoyaProvider<Target> {
    let baseURL: URL
    let responseErrorMapper: (ServerError) -> Error

    {access} convenience init(baseURL: URL, addHeadersClosure: HTTPHeadersPlugin.HTTPHeadersClosure? = nil, accessToken: String? = nil, logLevel: Moya.NetworkLoggerPlugin.Configuration.LogOptions? = nil, protocolClasses: [AnyClass]? = nil, responseErrorMapper: @escaping (ServerError) -> Error = { $0 }) {
        var plugins: [PluginType] = []

        if let accessToken = accessToken {
            plugins.append(AccessTokenPlugin(tokenClosure: { _ in accessToken }))
        }

        if let headersClosure = addHeadersClosure {
            plugins.append(HTTPHeadersPlugin(headersClosure: headersClosure))
        }

        self.init(baseURL: baseURL, plugins: plugins, logLevel: logLevel, protocolClasses: protocolClasses, responseErrorMapper: responseErrorMapper)
    }

    {access} init(baseURL: URL, plugins: [Moya.PluginType] = [], logLevel: Moya.NetworkLoggerPlugin.Configuration.LogOptions? = nil, protocolClasses: [AnyClass]? = nil, responseErrorMapper: @escaping (ServerError) -> Error = { $0 }) {
        self.baseURL = baseURL
        self.responseErrorMapper = responseErrorMapper
        var serverPlugins: [PluginType] = []

        if ProcessInfo.processInfo.environment["NETWORK_LOGS"] != nil || logLevel != nil {
            serverPlugins.append(NetworkLoggerPlugin(configuration: .init(logOptions: logLevel ?? .verbose)))
        }
        serverPlugins.append(contentsOf: plugins)

        let configuration = type(of: self).alamofireSessionConfiguration(protocolClasses: protocolClasses)
        let session = Session(configuration: configuration, startRequestsImmediately: false)

        super.init(endpointClosure: { target -> Endpoint in
            let url: URL
            if target.path.hasPrefix("/") {
                url = baseURL.appendingPathComponent(String(target.path.dropFirst()))
            } else {
                url = baseURL.appendingPathComponent(target.path)
            }

            return Endpoint(
                url: url.absoluteString,
                sampleResponseClosure: { .networkResponse(200, target.sampleData) },
                method: target.method,
                task: target.task,
                httpHeaderFields: target.headers
            )
        }, callbackQueue: callbackQueue, session: session, plugins: serverPlugins)
    }

    {class_access} class func alamofireSessionConfiguration(protocolClasses: [AnyClass]?) -> URLSessionConfiguration {
        let configuration = URLSessionConfiguration.default
        configuration.protocolClasses = protocolClasses
        configuration.headers = .default
        return configuration
    }

    // MARK: - Callback requests

    @discardableResult
    {class_access} func request(_ target: Target, callbackQueue: DispatchQueue? = .none, progress: ProgressBlock? = .none, completion: @escaping (Result<Void, ServerError>) -> Void) -> Moya.Cancellable {
        return super.request(target, callbackQueue: callbackQueue, progress: progress) { responseResult in
            let result = Result<Void, Error> {
                let response = try responseResult.get()
                guard response.statusCode >= 200, response.statusCode < 300 else {
                    throw ServerError.invalidResponseCode(response.statusCode, response.data)
                }
                return Void()
            }
            completion(result.mappedError())
        }
    }

    @discardableResult
    {class_access} func request<DataType: Decodable>(_ target: Target, callbackQueue: DispatchQueue? = .none, progress: ProgressBlock? = .none, completion: @escaping (Result<DataType, ServerError>) -> Void) -> Moya.Cancellable {
        return super.request(target, callbackQueue: callbackQueue, progress: progress) { responseResult in
            let result = Result<DataType, Error> {
                let response = try responseResult.get()
                guard response.statusCode >= 200, response.statusCode < 300 else {
                    throw ServerError.invalidResponseCode(response.statusCode, response.data)
                }
                do {
                    return try JSONDecoder().decodeSafe(DataType.self, from: response.data)
                } catch {
                    throw ServerError.decoding(error)
                }
            }
            completion(result.mappedError())
        }
    }

    // MARK: - Sync requests

    {class_access} func response(_ target: Target, callbackQueue: DispatchQueue? = .none, progress: ProgressBlock? = .none) throws {
        assert(Thread.isMainThread == false)

        var result: Result<Void, ServerError>!
        let semaphore = DispatchSemaphore(value: 0)
        self.request(target, callbackQueue: callbackQueue, progress: progress) { (response: Result<Void, ServerError>) in
            result = response
            semaphore.signal()
        }
        semaphore.wait()
        return try result.mapError(responseErrorMapper).get()
    }

    {class_access} func response<DataType: Decodable>(_ target: Target, callbackQueue: DispatchQueue? = .none, progress: ProgressBlock? = .none) throws -> DataType {
        assert(Thread.isMainThread == false)

        var result: Result<DataType, ServerError>!
        let semaphore = DispatchSemaphore(value: 0)
        self.request(target, callbackQueue: callbackQueue, progress: progress) { (response: Result<DataType, ServerError>) in
            result = response
            semaphore.signal()
        }
        semaphore.wait()
        return try result.mapError(responseErrorMapper).get()
    }

    // MARK: - Async requests

    {available}
    {class_access} func request(_ target: Target, callbackQueue: DispatchQueue? = .none, progress: ProgressBlock? = .none) async throws {
        var cancellable: Moya.Cancellable?

        return try await withTaskCancellationHandler {
            return try await withCheckedThrowingContinuation { continuation in
                cancellable = self.request(target, callbackQueue: callbackQueue, progress: progress) { (responseResult: Result<Void, ServerError>) in
                    continuation.resume(with: responseResult.mapError(self.responseErrorMapper))
                }
            }
        } onCancel: { [cancellable] in
            cancellable?.cancel()
        }
    }

    {available}
    {class_access} func request<DataType: Decodable>(_ target: Target, callbackQueue: DispatchQueue? = .none, progress: ProgressBlock? = .none) async throws -> DataType {
        var cancellable: Moya.Cancellable?

        return try await withTaskCancellationHandler {
            return try await withCheckedThrowingContinuation { continuation in
                cancellable = self.request(target, callbackQueue: callbackQueue, progress: progress) { (responseResult: Result<DataType, ServerError>) in
                    continuation.resume(with: responseResult.mapError(self.responseErrorMapper))
                }
            }
        } onCancel: { [cancellable] in
            cancellable?.cancel()
        }
    }
}
"#;

/// Generates `Utils.swift`.
pub fn utils(config: &GeneratorConfig) -> SourceUnit {
    let mut text = String::from(UTILS);
    if config.emit_response_decoding {
        text.push_str(RESPONSE_DECODING);
    }
    SourceUnit::new("Utils.swift", render(&text, config))
}

/// Generates `Server.swift`.
pub fn server(config: &GeneratorConfig) -> SourceUnit {
    SourceUnit::new("Server.swift", render(SERVER, config))
}

/// Fills in access levels and availability guards, and adds
/// the prologue.
fn render(template: &str, config: &GeneratorConfig) -> String {
    let access = config.access_level.modifier();
    let class_access = config.access_level.class_modifier();
    let available = config
        .async_availability_guard
        .as_deref()
        .map(|guard| format!("@available({})", guard.trim()));

    let mut w = SwiftWriter::file(true);
    for line in template.lines() {
        let line = if line.contains("{available}") {
            match &available {
                Some(available) => line.replace("{available}", available),
                None => continue,
            }
        } else {
            line.to_owned()
        };
        w.line(
            line.replace("{class_access}", class_access)
                .replace("{access}", access),
        );
    }
    w.finish()
}
